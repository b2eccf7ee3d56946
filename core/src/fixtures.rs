//! Per-worker and per-test setup.
//!
//! # Design
//! A test binary is one worker. The auth token is fetched at most once per
//! worker and cached in a `OnceCell`; it is never refreshed, so scenarios that
//! need a bad token pass one explicitly. The fetch runs on a transient client
//! that is dropped as soon as the token is in hand, so no connection state
//! outlives it. Everything else (`Fixture`) is built fresh per test.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::api::{AuthClient, Clients};
use crate::client::HttpClient;
use crate::config::Config;
use crate::diagnostics::MemorySink;
use crate::error::ApiError;

/// Lazily fetched, immutable auth token.
#[derive(Debug)]
pub struct TokenCache {
    cell: OnceCell<String>,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// The cached token, fetching it on first use. Concurrent first callers
    /// wait on a single fetch; a failed fetch leaves the cache empty.
    pub async fn get_or_fetch(&self, config: &Config) -> Result<&str, ApiError> {
        self.cell
            .get_or_try_init(|| fetch_token(config))
            .await
            .map(String::as_str)
    }

    pub fn get(&self) -> Option<&str> {
        self.cell.get().map(String::as_str)
    }
}

/// Authenticate with `config`'s credentials on a client used only for this
/// call.
pub async fn fetch_token(config: &Config) -> Result<String, ApiError> {
    let auth = AuthClient::new(HttpClient::new(config)?);
    let response = auth.create_token(&config.credentials()).await?;
    drop(auth);

    if !response.ok {
        return Err(ApiError::UnexpectedStatus {
            context: "Failed to create auth token".to_string(),
            status: response.status,
            status_text: response.status_text.clone(),
            snippet: response.snippet(),
        });
    }

    let snippet = response.snippet();
    match response.body.into_json().and_then(|body| body.token) {
        Some(token) if !token.is_empty() => {
            debug!(base_url = %config.base_url, "obtained worker auth token");
            Ok(token)
        }
        _ => Err(ApiError::MissingFields {
            context: "Auth token missing in response.".to_string(),
            snippet,
        }),
    }
}

/// The token shared by every test in this process.
///
/// Bound to the config of the first successful call.
pub async fn worker_token(config: &Config) -> Result<String, ApiError> {
    static WORKER_TOKEN: TokenCache = TokenCache::new();
    WORKER_TOKEN.get_or_fetch(config).await.map(str::to_string)
}

/// Per-test clients with an in-memory attachment sink installed.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub http: HttpClient,
    pub clients: Clients,
    pub attachments: Arc<MemorySink>,
}

impl Fixture {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let attachments = Arc::new(MemorySink::new());
        let http = HttpClient::new(config)?.with_attachment_sink(attachments.clone());
        Ok(Self {
            clients: Clients::new(http.clone()),
            http,
            attachments,
        })
    }
}
