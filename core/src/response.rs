//! Response normalization.
//!
//! Turns a `RawResponse` into lower-cased headers and a parsed body. Parsing
//! never fails: every failure degrades along JSON → text → empty.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Upper bound for body snippets in logs and failure messages.
pub const MAX_BODY_SNIPPET: usize = 2048;

/// Parsed response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body<T> {
    /// JSON that decoded into `T`.
    Json(T),
    /// Raw text, either a non-JSON body or JSON that did not decode.
    Text(String),
    /// No content, or the body could not be read.
    Empty,
}

impl<T> Body<T> {
    pub fn json(&self) -> Option<&T> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<T> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

impl Body<Value> {
    /// Decode a dynamically parsed body into `T`, keeping the raw JSON text
    /// when the shape does not match.
    pub fn decode<T: DeserializeOwned>(self) -> Body<T> {
        match self {
            Body::Json(value) => match T::deserialize(&value) {
                Ok(decoded) => Body::Json(decoded),
                Err(_) => Body::Text(value.to_string()),
            },
            Body::Text(text) => Body::Text(text),
            Body::Empty => Body::Empty,
        }
    }
}

/// A normalized HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse<T> {
    /// `true` iff `status` is in `[200, 400)`.
    pub ok: bool,
    pub status: u16,
    pub status_text: String,
    /// Header names are lower-cased.
    pub headers: BTreeMap<String, String>,
    pub url: String,
    pub body: Body<T>,
}

impl<T> HttpResponse<T> {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn json(&self) -> Option<&T> {
        self.body.json()
    }
}

impl<T: Serialize> HttpResponse<T> {
    /// Bounded textual rendering of the body for diagnostics.
    pub fn snippet(&self) -> String {
        body_snippet(&self.body, MAX_BODY_SNIPPET)
    }
}

pub fn is_ok_status(status: u16) -> bool {
    (200..400).contains(&status)
}

/// Lower-case header names; repeated headers are joined with `", "`.
pub fn normalize_headers(raw: &[(String, String)]) -> BTreeMap<String, String> {
    let mut normalized: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in raw {
        normalized
            .entry(key.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.clone());
    }
    normalized
}

pub fn is_json_content_type(headers: &BTreeMap<String, String>) -> bool {
    let content_type = headers.get("content-type").map(String::as_str).unwrap_or("");
    content_type.contains("application/json") || content_type.contains("+json")
}

/// Parse a body according to status and (already normalized) headers.
pub fn parse_body(status: u16, headers: &BTreeMap<String, String>, bytes: Option<&[u8]>) -> Body<Value> {
    if status == 204 {
        return Body::Empty;
    }
    if headers.get("content-length").map(String::as_str) == Some("0") {
        return Body::Empty;
    }
    let Some(bytes) = bytes else {
        return Body::Empty;
    };

    if is_json_content_type(headers) {
        if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
            return Body::Json(value);
        }
    }

    Body::Text(String::from_utf8_lossy(bytes).into_owned())
}

/// Render a body for logs: JSON is stringified, text is kept, empty is `""`.
/// The result is capped at `limit` characters.
pub fn body_snippet<T: Serialize>(body: &Body<T>, limit: usize) -> String {
    match body {
        Body::Empty => String::new(),
        Body::Text(text) => truncate_chars(text, limit),
        Body::Json(value) => match serde_json::to_string(value) {
            Ok(json) => truncate_chars(&json, limit),
            Err(_) => "[unserializable body]".to_string(),
        },
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
