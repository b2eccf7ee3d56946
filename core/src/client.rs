//! Generic JSON-over-HTTP client used by the domain clients.
//!
//! # Design
//! `HttpClient` splits every call into a pure `build_request` step (URL and
//! query construction, header merging, content-type defaulting) and the
//! network round-trip performed by a `Transport`. The response is normalized
//! into an `HttpResponse<T>`; non-ok statuses are returned as values and only
//! logged, so callers decide what counts as failure. Transport errors and
//! timeouts propagate as `ApiError`.
//!
//! The client holds no per-call state and is cheap to clone.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::config::{Config, DEFAULT_TIMEOUT};
use crate::diagnostics::{request_attachment, response_attachment, Attachment, AttachmentSink};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, ReqwestTransport, Transport};
use crate::response::{body_snippet, is_ok_status, normalize_headers, parse_body, Body, HttpResponse, MAX_BODY_SNIPPET};

/// Per-call options. Everything is optional; `RequestOptions::default()` sends
/// a bare request with the client's defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    headers: Vec<(String, String)>,
    query: Vec<(String, Option<String>)>,
    json: Option<Value>,
    timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a header. Replacement matches the exact key.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        upsert(&mut self.headers, key.into(), value.into());
        self
    }

    pub fn query(self, key: impl Into<String>, value: impl Display) -> Self {
        self.query_opt(key, Some(value))
    }

    /// Add a query parameter that is dropped when `value` is `None`.
    pub fn query_opt<V: Display>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.query.push((key.into(), value.map(|v| v.to_string())));
        self
    }

    pub fn json_value(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self, ApiError> {
        Ok(self.json_value(serde_json::to_value(body)?))
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Query parameters with `None` values removed, or `None` if nothing is
    /// left. A later entry for the same key replaces an earlier one, so
    /// `query_opt(key, None)` cancels a previous value.
    fn cleaned_query(&self) -> Option<BTreeMap<String, String>> {
        let latest: BTreeMap<&str, Option<&String>> = self
            .query
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_ref()))
            .collect();
        let cleaned: BTreeMap<String, String> = latest
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key.to_string(), v.clone())))
            .collect();
        (!cleaned.is_empty()).then_some(cleaned)
    }
}

/// JSON HTTP client bound to one base URL.
#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    default_headers: Vec<(String, String)>,
    default_timeout: Duration,
    transport: Arc<dyn Transport>,
    sink: Option<Arc<dyn AttachmentSink>>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers)
            .field("default_timeout", &self.default_timeout)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

impl HttpClient {
    /// Client over the network for `config.base_url`.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_transport(&config.base_url, transport).with_default_timeout(config.timeout))
    }

    /// Client over an arbitrary transport. Defaults: `Accept:
    /// application/json`, `DEFAULT_TIMEOUT`, no attachment sink.
    pub fn with_transport(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_headers: vec![("Accept".to_string(), "application/json".to_string())],
            default_timeout: DEFAULT_TIMEOUT,
            transport,
            sink: None,
        }
    }

    pub fn with_attachment_sink(mut self, sink: Arc<dyn AttachmentSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        upsert(&mut self.default_headers, key.into(), value.into());
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<HttpResponse<T>, ApiError> {
        self.request(HttpMethod::Get, path, options).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<HttpResponse<T>, ApiError> {
        self.request(HttpMethod::Post, path, options).await
    }

    pub async fn put<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<HttpResponse<T>, ApiError> {
        self.request(HttpMethod::Put, path, options).await
    }

    pub async fn patch<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<HttpResponse<T>, ApiError> {
        self.request(HttpMethod::Patch, path, options).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<HttpResponse<T>, ApiError> {
        self.request(HttpMethod::Delete, path, options).await
    }

    /// Build the request `method path` would send, without sending it.
    pub fn build_request(&self, method: HttpMethod, path: &str, options: &RequestOptions) -> Result<HttpRequest, ApiError> {
        let query = options.cleaned_query();
        let url = self.resolve(&build_url(path, query.as_ref()));

        let mut headers = self.default_headers.clone();
        for (key, value) in &options.headers {
            upsert(&mut headers, key.clone(), value.clone());
        }
        if options.json.is_some() && !has_content_type(&headers) {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        let body = options.json.as_ref().map(serde_json::to_string).transpose()?;

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: options.timeout.unwrap_or(self.default_timeout),
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse<T>, ApiError> {
        let request = self.build_request(method, path, &options)?;
        let url = request.url.clone();
        debug!(%method, %url, "sending request");

        if self.sink.is_some() {
            let query = options.cleaned_query();
            self.emit(request_attachment(
                method.as_str(),
                path,
                &url,
                &request.headers,
                query.as_ref(),
                options.json.as_ref(),
            ));
        }

        let raw = self.transport.execute(request).await?;

        let headers = normalize_headers(&raw.headers);
        let body = parse_body(raw.status, &headers, raw.body.as_deref());
        let response_url = if raw.url.is_empty() { url.clone() } else { raw.url };
        let ok = is_ok_status(raw.status);

        if self.sink.is_some() {
            let rendered = match &body {
                Body::Json(value) => value.clone(),
                Body::Text(text) => Value::String(text.clone()),
                Body::Empty => Value::Null,
            };
            self.emit(response_attachment(
                method.as_str(),
                &url,
                &response_url,
                raw.status,
                &raw.status_text,
                &headers,
                &rendered,
            ));
        }

        if !ok {
            let snippet = body_snippet(&body, MAX_BODY_SNIPPET);
            warn!(
                %method,
                %url,
                status = raw.status,
                status_text = %raw.status_text,
                body = %snippet,
                "{method} {url} -> {} {}",
                raw.status,
                raw.status_text
            );
        }

        Ok(HttpResponse {
            ok,
            status: raw.status,
            status_text: raw.status_text,
            headers,
            url: response_url,
            body: body.decode(),
        })
    }

    fn emit(&self, attachment: Attachment) {
        let Some(sink) = &self.sink else {
            return;
        };
        let name = attachment.name.clone();
        if let Err(err) = sink.attach(attachment) {
            warn!(attachment = %name, error = %err, "failed to attach diagnostics");
        }
    }

    fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

/// Append URL-encoded query parameters to `path`, using `&` if it already has
/// a query string.
pub fn build_url(path: &str, query: Option<&BTreeMap<String, String>>) -> String {
    let Some(query) = query.filter(|query| !query.is_empty()) else {
        return path.to_string();
    };
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query.iter())
        .finish();
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{encoded}")
}

fn has_content_type(headers: &[(String, String)]) -> bool {
    headers.iter().any(|(key, _)| key.eq_ignore_ascii_case("content-type"))
}

fn upsert(headers: &mut Vec<(String, String)>, key: String, value: String) {
    match headers.iter_mut().find(|(existing, _)| *existing == key) {
        Some(entry) => entry.1 = value,
        None => headers.push((key, value)),
    }
}
