//! Verify request building and response parsing against the JSON vectors in
//! `test-vectors/`.
//!
//! Bodies are compared as parsed JSON so key order in the vector files does
//! not matter. Nothing here touches the network.

use std::sync::Arc;
use std::time::Duration;

use booker_core::response::{is_ok_status, normalize_headers, parse_body};
use booker_core::{Body, HttpClient, HttpMethod, RequestOptions, ReqwestTransport};
use serde_json::Value;

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn pairs(value: &Value) -> Vec<(String, Option<String>)> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|pair| {
                    let arr = pair.as_array().unwrap();
                    (arr[0].as_str().unwrap().to_string(), arr[1].as_str().map(str::to_string))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn options(case: &Value) -> RequestOptions {
    let raw = &case["options"];
    let mut options = RequestOptions::new();
    for (key, value) in pairs(&raw["headers"]) {
        options = options.header(key, value.unwrap());
    }
    for (key, value) in pairs(&raw["query"]) {
        options = options.query_opt(key, value);
    }
    if let Some(body) = raw.get("json") {
        options = options.json_value(body.clone());
    }
    if let Some(ms) = raw["timeout_ms"].as_u64() {
        options = options.timeout(Duration::from_millis(ms));
    }
    options
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let transport = Arc::new(ReqwestTransport::new().unwrap());
    let client = HttpClient::with_transport(vectors["base_url"].as_str().unwrap(), transport);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let method = parse_method(case["method"].as_str().unwrap());
        let expected = &case["expected_request"];

        let req = client
            .build_request(method, case["path"].as_str().unwrap(), &options(case))
            .unwrap();

        assert_eq!(req.method, method, "{name}: method");
        assert_eq!(req.url, expected["url"].as_str().unwrap(), "{name}: url");

        let expected_headers: Vec<(String, String)> = pairs(&expected["headers"])
            .into_iter()
            .map(|(k, v)| (k, v.unwrap()))
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        match req.body.as_deref() {
            Some(body) => {
                let sent: Value = serde_json::from_str(body).unwrap();
                assert_eq!(sent, expected["body"], "{name}: body");
            }
            None => assert!(expected["body"].is_null(), "{name}: body should be None"),
        }

        assert_eq!(
            req.timeout,
            Duration::from_millis(expected["timeout_ms"].as_u64().unwrap()),
            "{name}: timeout"
        );
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let headers: Vec<(String, String)> = pairs(&case["headers"])
            .into_iter()
            .map(|(k, v)| (k, v.unwrap()))
            .collect();
        let bytes = case["body"].as_str().map(str::as_bytes);
        let expected = &case["expected"];

        assert_eq!(is_ok_status(status), expected["ok"].as_bool().unwrap(), "{name}: ok");

        let body = parse_body(status, &normalize_headers(&headers), bytes);
        match expected["kind"].as_str().unwrap() {
            "json" => assert_eq!(body, Body::Json(expected["value"].clone()), "{name}: body"),
            "text" => assert_eq!(
                body,
                Body::Text(expected["value"].as_str().unwrap().to_string()),
                "{name}: body"
            ),
            "empty" => assert_eq!(body, Body::Empty, "{name}: body"),
            other => panic!("{name}: unknown body kind: {other}"),
        }
    }
}
