//! Test client core for the booking REST service.
//!
//! # Overview
//! A JSON HTTP client with response normalization and sanitized diagnostics,
//! typed clients for the auth and booking endpoints, and the helpers that keep
//! API tests reliable: a payload builder, create/use/cleanup lifecycle
//! helpers, a worker-scoped token cache and domain assertions.
//!
//! # Design
//! - Request construction is pure (`HttpClient::build_request`); the network
//!   round-trip sits behind the `Transport` trait.
//! - Non-ok HTTP statuses are values (`HttpResponse::ok == false`), never
//!   errors. `ApiError` is reserved for transport failures and broken
//!   contracts in the lifecycle helpers.
//! - Bodies are a tagged `Body<T>`: decoded JSON, raw text or empty.

pub mod api;
pub mod assertions;
pub mod builder;
pub mod client;
pub mod config;
pub mod dates;
pub mod diagnostics;
pub mod error;
pub mod fixtures;
pub mod http;
pub mod lifecycle;
pub mod response;
pub mod types;

pub use api::{AuthClient, BookingClient, Clients};
pub use builder::BookingRequestBuilder;
pub use client::{HttpClient, RequestOptions};
pub use config::Config;
pub use diagnostics::{Attachment, AttachmentSink, MemorySink};
pub use error::ApiError;
pub use fixtures::{worker_token, Fixture, TokenCache};
pub use http::{HttpMethod, HttpRequest, RawResponse, ReqwestTransport, Transport};
pub use lifecycle::{create_booking_or_fail, delete_booking_quietly, with_booking, CreatedBooking};
pub use response::{Body, HttpResponse};
pub use types::{
    AuthRequest, AuthResponse, Booking, BookingDates, BookingIdItem, BookingSearchQuery, CreateBookingRequest,
    CreateBookingResponse, PartialBookingDates, PartialUpdateBookingRequest,
};
