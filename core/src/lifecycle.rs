//! Create → use → clean up helpers for booking scenarios.
//!
//! Creation is strict: anything other than an ok response carrying both
//! `bookingid` and `booking` is an error with status and a body snippet.
//! Deletion is best-effort and only logs.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tracing::warn;

use crate::api::Clients;
use crate::error::ApiError;
use crate::types::Booking;

/// A booking created by `create_booking_or_fail`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedBooking {
    pub booking_id: i64,
    pub booking: Booking,
}

pub async fn create_booking_or_fail(clients: &Clients, payload: &Booking) -> Result<CreatedBooking, ApiError> {
    let response = clients.booking.create_booking(payload).await?;
    if !response.ok {
        return Err(ApiError::UnexpectedStatus {
            context: "Failed to create booking".to_string(),
            status: response.status,
            status_text: response.status_text.clone(),
            snippet: response.snippet(),
        });
    }

    let snippet = response.snippet();
    match response.body.into_json() {
        Some(created) if created.bookingid > 0 => Ok(CreatedBooking {
            booking_id: created.bookingid,
            booking: created.booking,
        }),
        _ => Err(ApiError::MissingFields {
            context: "Create booking response missing fields.".to_string(),
            snippet,
        }),
    }
}

/// Delete a booking, logging instead of failing on any error.
pub async fn delete_booking_quietly(clients: &Clients, token: &str, booking_id: i64) {
    match clients.booking.delete_booking(booking_id, token).await {
        Ok(response) if !response.ok => {
            warn!(
                booking_id,
                status = response.status,
                body = %response.snippet(),
                "Failed to delete booking {booking_id}: {} {}",
                response.status,
                response.status_text
            );
        }
        Ok(_) => {}
        Err(err) => {
            warn!(booking_id, error = %err, "Failed to delete booking {booking_id}: {err}");
        }
    }
}

/// Create a booking, run `scenario` with it, then delete it.
///
/// Cleanup runs however `scenario` ends; a panic inside it is resumed after
/// the delete attempt.
pub async fn with_booking<F, Fut, T>(clients: &Clients, token: &str, payload: &Booking, scenario: F) -> Result<T, ApiError>
where
    F: FnOnce(i64, Booking) -> Fut,
    Fut: Future<Output = T>,
{
    let CreatedBooking { booking_id, booking } = create_booking_or_fail(clients, payload).await?;

    let outcome = AssertUnwindSafe(async move { scenario(booking_id, booking).await })
        .catch_unwind()
        .await;

    delete_booking_quietly(clients, token, booking_id).await;

    match outcome {
        Ok(value) => Ok(value),
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HttpClient;
    use crate::http::{HttpMethod, HttpRequest, RawResponse, Transport};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tracing_test::traced_test;

    /// Answers by method with canned responses and records what was sent.
    struct Scripted {
        create: (u16, &'static str),
        delete: Option<(u16, &'static str)>,
        seen: Mutex<Vec<HttpMethod>>,
    }

    impl Scripted {
        fn new(create: (u16, &'static str), delete: Option<(u16, &'static str)>) -> Arc<Self> {
            Arc::new(Self {
                create,
                delete,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn methods(&self) -> Vec<HttpMethod> {
            self.seen.lock().unwrap().clone()
        }
    }

    fn raw(status: u16, content_type: &str, body: &str) -> RawResponse {
        RawResponse {
            status,
            status_text: reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or_default()
                .to_string(),
            url: String::new(),
            headers: vec![("content-type".to_string(), content_type.to_string())],
            body: Some(body.as_bytes().to_vec()),
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn execute(&self, request: HttpRequest) -> Result<RawResponse, ApiError> {
            self.seen.lock().unwrap().push(request.method);
            match request.method {
                HttpMethod::Post => Ok(raw(self.create.0, "application/json", self.create.1)),
                HttpMethod::Delete => match self.delete {
                    Some((status, body)) => Ok(raw(status, "text/plain", body)),
                    None => Err(ApiError::Timeout {
                        method: request.method,
                        url: request.url,
                        timeout: request.timeout,
                    }),
                },
                _ => Ok(raw(200, "application/json", "{}")),
            }
        }
    }

    const CREATED: &str = r#"{"bookingid":42,"booking":{"firstname":"John","lastname":"Doe","totalprice":123,"depositpaid":true,"bookingdates":{"checkin":"2025-01-01","checkout":"2025-01-05"},"additionalneeds":"Breakfast"}}"#;

    fn clients(transport: Arc<Scripted>) -> Clients {
        Clients::new(HttpClient::with_transport("http://localhost:3001", transport))
    }

    fn payload() -> Booking {
        crate::builder::BookingRequestBuilder::default()
            .with_dates("2025-01-01", "2025-01-05")
            .build()
    }

    #[tokio::test]
    async fn create_returns_id_and_booking() {
        let created = create_booking_or_fail(&clients(Scripted::new((200, CREATED), None)), &payload())
            .await
            .unwrap();
        assert_eq!(created.booking_id, 42);
        assert_eq!(created.booking, payload());
    }

    #[tokio::test]
    async fn create_non_ok_reports_status_and_snippet() {
        let transport = Scripted::new((500, r#"{"error":"boom"}"#), None);
        let err = create_booking_or_fail(&clients(transport), &payload()).await.unwrap_err();
        match &err {
            ApiError::UnexpectedStatus { status, status_text, snippet, .. } => {
                assert_eq!(*status, 500);
                assert_eq!(status_text, "Internal Server Error");
                assert_eq!(snippet, r#"{"error":"boom"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("Failed to create booking: 500 Internal Server Error"));
    }

    #[tokio::test]
    async fn create_ok_without_bookingid_is_a_contract_violation() {
        let transport = Scripted::new((200, r#"{"booking":null}"#), None);
        let err = create_booking_or_fail(&clients(transport), &payload()).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingFields { ref snippet, .. } if snippet == r#"{"booking":null}"#));
    }

    #[tokio::test]
    #[traced_test]
    async fn delete_quietly_swallows_non_ok() {
        let transport = Scripted::new((200, CREATED), Some((403, "Forbidden")));
        delete_booking_quietly(&clients(transport), "bad", 42).await;
        assert!(logs_contain("Failed to delete booking 42: 403 Forbidden"));
    }

    #[tokio::test]
    #[traced_test]
    async fn delete_quietly_swallows_transport_errors() {
        let transport = Scripted::new((200, CREATED), None);
        delete_booking_quietly(&clients(transport), "tok", 42).await;
        assert!(logs_contain("Failed to delete booking 42"));
        assert!(logs_contain("timed out"));
    }

    #[tokio::test]
    async fn with_booking_cleans_up_after_success() {
        let transport = Scripted::new((200, CREATED), Some((201, "Created")));
        let c = clients(transport.clone());
        let result = with_booking(&c, "tok", &payload(), |id, booking| async move {
            assert_eq!(id, 42);
            booking.firstname
        })
        .await
        .unwrap();
        assert_eq!(result, "John");
        assert_eq!(transport.methods(), vec![HttpMethod::Post, HttpMethod::Delete]);
    }

    #[tokio::test]
    async fn with_booking_cleans_up_after_scenario_error() {
        let transport = Scripted::new((200, CREATED), Some((201, "Created")));
        let c = clients(transport.clone());
        let result: Result<Result<(), String>, ApiError> =
            with_booking(&c, "tok", &payload(), |_, _| async { Err("assertion failed".to_string()) }).await;
        assert_eq!(result.unwrap(), Err("assertion failed".to_string()));
        assert_eq!(transport.methods(), vec![HttpMethod::Post, HttpMethod::Delete]);
    }

    #[tokio::test]
    async fn with_booking_cleans_up_after_panic() {
        let transport = Scripted::new((200, CREATED), Some((201, "Created")));
        let c = clients(transport.clone());
        let outcome = AssertUnwindSafe(with_booking(&c, "tok", &payload(), |_, _| async {
            panic!("scenario blew up");
        }))
        .catch_unwind()
        .await;
        assert!(outcome.is_err());
        assert_eq!(transport.methods(), vec![HttpMethod::Post, HttpMethod::Delete]);
    }

    #[tokio::test]
    async fn with_booking_skips_scenario_when_create_fails() {
        let transport = Scripted::new((400, "{}"), Some((201, "Created")));
        let c = clients(transport.clone());
        let mut ran = false;
        let result = with_booking(&c, "tok", &payload(), |_, _| {
            ran = true;
            async {}
        })
        .await;
        assert!(result.is_err());
        assert!(!ran);
        assert_eq!(transport.methods(), vec![HttpMethod::Post]);
    }
}
