//! Request/response attachments for external reporting.
//!
//! # Design
//! The client renders each exchange into two `Attachment` records and hands
//! them to an optional `AttachmentSink`. Records are sanitized before they
//! leave the client: credential-bearing headers and body keys are masked at
//! any nesting depth, and the rendered JSON is bounded to
//! `MAX_ATTACHMENT_BYTES`. A failing sink is logged and otherwise ignored.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde_json::{Map, Value};

/// Replacement for masked values.
pub const MASK: &str = "***";

/// Size bound for a rendered attachment body, in UTF-8 bytes.
pub const MAX_ATTACHMENT_BYTES: usize = 20 * 1024;

const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie", "x-api-key", "x-api_key"];

const SENSITIVE_BODY_KEYS: &[&str] = &[
    "password",
    "pass",
    "token",
    "authorization",
    "cookie",
    "set-cookie",
    "apikey",
    "x-api-key",
];

pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// One diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub content_type: String,
    pub body: String,
}

/// Receives attachments emitted by `HttpClient`.
pub trait AttachmentSink: Send + Sync {
    fn attach(&self, attachment: Attachment) -> Result<(), SinkError>;
}

impl<F> AttachmentSink for F
where
    F: Fn(Attachment) -> Result<(), SinkError> + Send + Sync,
{
    fn attach(&self, attachment: Attachment) -> Result<(), SinkError> {
        self(attachment)
    }
}

/// Collects attachments in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Attachment>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything attached so far.
    pub fn attachments(&self) -> Vec<Attachment> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl AttachmentSink for MemorySink {
    fn attach(&self, attachment: Attachment) -> Result<(), SinkError> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(attachment);
        Ok(())
    }
}

fn is_sensitive(list: &[&str], key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    list.iter().any(|candidate| *candidate == lower)
}

/// Mask credential headers, keeping the original key spelling.
pub fn sanitize_headers<'a, I>(headers: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    headers
        .into_iter()
        .map(|(key, value)| {
            let value = if is_sensitive(SENSITIVE_HEADERS, key) {
                MASK.to_string()
            } else {
                value.clone()
            };
            (key.clone(), Value::String(value))
        })
        .collect()
}

/// Recursively mask sensitive keys in objects, descending into arrays.
pub fn sanitize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, inner)| {
                    let inner = if is_sensitive(SENSITIVE_BODY_KEYS, key) {
                        Value::String(MASK.to_string())
                    } else {
                        sanitize_json(inner)
                    };
                    (key.clone(), inner)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_json).collect()),
        other => other.clone(),
    }
}

/// Pretty-print `value` and bound the result to `limit_bytes`.
pub fn safe_json_stringify(value: &Value, limit_bytes: usize) -> String {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    truncate_to_bytes(&text, limit_bytes).to_string()
}

/// Cut `text` to at most `limit_bytes` of UTF-8, backing off to the nearest
/// char boundary.
pub fn truncate_to_bytes(text: &str, limit_bytes: usize) -> &str {
    if text.len() <= limit_bytes {
        return text;
    }
    let mut end = limit_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

pub(crate) fn request_attachment(
    method: &str,
    path: &str,
    url: &str,
    headers: &[(String, String)],
    query: Option<&BTreeMap<String, String>>,
    body: Option<&Value>,
) -> Attachment {
    let mut payload = Map::new();
    payload.insert("method".into(), Value::String(method.to_string()));
    payload.insert("path".into(), Value::String(path.to_string()));
    payload.insert("url".into(), Value::String(url.to_string()));
    payload.insert(
        "headers".into(),
        Value::Object(sanitize_headers(headers.iter().map(|(k, v)| (k, v)))),
    );
    payload.insert(
        "query".into(),
        query.map_or(Value::Null, |query| {
            Value::Object(
                query
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            )
        }),
    );
    payload.insert("body".into(), body.map_or(Value::Null, sanitize_json));

    Attachment {
        name: format!("API Request: {method} {path}"),
        content_type: "application/json".to_string(),
        body: safe_json_stringify(&Value::Object(payload), MAX_ATTACHMENT_BYTES),
    }
}

/// `url` names the record; `response_url` is where the response actually
/// came from after redirects.
pub(crate) fn response_attachment(
    method: &str,
    url: &str,
    response_url: &str,
    status: u16,
    status_text: &str,
    headers: &BTreeMap<String, String>,
    body: &Value,
) -> Attachment {
    let mut payload = Map::new();
    payload.insert("status".into(), Value::from(status));
    payload.insert("statusText".into(), Value::String(status_text.to_string()));
    payload.insert("url".into(), Value::String(response_url.to_string()));
    payload.insert("headers".into(), Value::Object(sanitize_headers(headers)));
    payload.insert("body".into(), sanitize_json(body));

    Attachment {
        name: format!("API Response: {status} {method} {url}"),
        content_type: "application/json".to_string(),
        body: safe_json_stringify(&Value::Object(payload), MAX_ATTACHMENT_BYTES),
    }
}
