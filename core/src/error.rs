//! Error types for the booking API harness.
//!
//! # Design
//! A non-ok HTTP response is not an error here: it comes back as an
//! `HttpResponse` with `ok == false` so tests can assert on it. `ApiError`
//! covers the cases where no response could be produced (transport, timeout,
//! serialization) and the contract violations raised by the lifecycle helpers
//! and the token fixture, which always carry status and a bounded body snippet.

use std::time::Duration;

use thiserror::Error;

use crate::http::HttpMethod;

/// Errors surfaced by the HTTP client and the lifecycle helpers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the connection failed.
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: HttpMethod,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request did not complete within its timeout.
    #[error("{method} {url} timed out after {}ms", .timeout.as_millis())]
    Timeout {
        method: HttpMethod,
        url: String,
        timeout: Duration,
    },

    /// The underlying HTTP transport could not be constructed.
    #[error("failed to build HTTP transport: {0}")]
    ClientInit(#[source] reqwest::Error),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A call with a strict contract got a non-ok response.
    #[error("{context}: {status} {status_text}{}", with_snippet(.snippet))]
    UnexpectedStatus {
        context: String,
        status: u16,
        status_text: String,
        snippet: String,
    },

    /// An ok response lacked the fields the caller depends on.
    #[error("{context}{}", with_snippet(.snippet))]
    MissingFields { context: String, snippet: String },
}

impl ApiError {
    /// Map a reqwest failure, keeping timeouts distinguishable.
    pub(crate) fn from_transport(
        method: HttpMethod,
        url: &str,
        timeout: Duration,
        source: reqwest::Error,
    ) -> Self {
        if source.is_timeout() {
            return ApiError::Timeout {
                method,
                url: url.to_string(),
                timeout,
            };
        }
        ApiError::Transport {
            method,
            url: url.to_string(),
            source,
        }
    }
}

fn with_snippet(snippet: &str) -> String {
    if snippet.is_empty() {
        String::new()
    } else {
        format!("\n{snippet}")
    }
}
