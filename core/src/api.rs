//! Typed clients for the auth and booking endpoints.
//!
//! # Design
//! These are direct pass-throughs to `HttpClient`: no validation, no retries,
//! no status interpretation. Every `HttpResponse` is surfaced as-is, so tests
//! can assert on negative outcomes. Token auth is a `Cookie: token=<token>`
//! header on the mutating booking endpoints.

use crate::client::{HttpClient, RequestOptions};
use crate::error::ApiError;
use crate::response::HttpResponse;
use crate::types::{
    AuthRequest, AuthResponse, Booking, BookingIdItem, BookingSearchQuery, CreateBookingResponse,
    PartialUpdateBookingRequest,
};

#[derive(Debug, Clone)]
pub struct AuthClient {
    http: HttpClient,
}

impl AuthClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// `POST /auth`.
    pub async fn create_token(&self, request: &AuthRequest) -> Result<HttpResponse<AuthResponse>, ApiError> {
        self.http.post("/auth", RequestOptions::new().json(request)?).await
    }
}

#[derive(Debug, Clone)]
pub struct BookingClient {
    http: HttpClient,
}

impl BookingClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// `GET /booking`, optionally filtered.
    pub async fn get_booking_ids(
        &self,
        query: Option<&BookingSearchQuery>,
    ) -> Result<HttpResponse<Vec<BookingIdItem>>, ApiError> {
        let mut options = RequestOptions::new();
        if let Some(query) = query {
            for (key, value) in query.pairs() {
                options = options.query_opt(key, value);
            }
        }
        self.http.get("/booking", options).await
    }

    pub async fn get_booking(&self, id: i64) -> Result<HttpResponse<Booking>, ApiError> {
        self.http.get(&booking_path(id), RequestOptions::new()).await
    }

    pub async fn create_booking(&self, payload: &Booking) -> Result<HttpResponse<CreateBookingResponse>, ApiError> {
        self.http.post("/booking", RequestOptions::new().json(payload)?).await
    }

    pub async fn update_booking(&self, id: i64, payload: &Booking, token: &str) -> Result<HttpResponse<Booking>, ApiError> {
        let options = with_token(RequestOptions::new().json(payload)?, token);
        self.http.put(&booking_path(id), options).await
    }

    pub async fn partial_update_booking(
        &self,
        id: i64,
        patch: &PartialUpdateBookingRequest,
        token: &str,
    ) -> Result<HttpResponse<Booking>, ApiError> {
        let options = with_token(RequestOptions::new().json(patch)?, token);
        self.http.patch(&booking_path(id), options).await
    }

    /// `DELETE /booking/{id}`. The service answers with a plain-text body.
    pub async fn delete_booking(&self, id: i64, token: &str) -> Result<HttpResponse<String>, ApiError> {
        self.http.delete(&booking_path(id), with_token(RequestOptions::new(), token)).await
    }

    /// `GET /ping` health check.
    pub async fn ping(&self) -> Result<HttpResponse<String>, ApiError> {
        self.http.get("/ping", RequestOptions::new()).await
    }
}

/// Both domain clients over one `HttpClient`.
#[derive(Debug, Clone)]
pub struct Clients {
    pub auth: AuthClient,
    pub booking: BookingClient,
}

impl Clients {
    pub fn new(http: HttpClient) -> Self {
        Self {
            auth: AuthClient::new(http.clone()),
            booking: BookingClient::new(http),
        }
    }
}

fn booking_path(id: i64) -> String {
    format!("/booking/{id}")
}

fn with_token(options: RequestOptions, token: &str) -> RequestOptions {
    options.header("Cookie", format!("token={token}"))
}
