//! Domain DTOs for the booking API.
//!
//! # Design
//! These types mirror the service's JSON schema. Optional fields are skipped
//! when absent rather than serialized as `null`, since the service
//! distinguishes an absent `additionalneeds` from an explicit one, and a
//! partial update must only carry the fields it changes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingDates {
    pub checkin: String,
    pub checkout: String,
}

/// A booking as stored by the service, and the payload used to create or
/// replace one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Booking {
    pub firstname: String,
    pub lastname: String,
    pub totalprice: i64,
    pub depositpaid: bool,
    pub bookingdates: BookingDates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additionalneeds: Option<String>,
}

pub type CreateBookingRequest = Booking;

/// Returned by `POST /booking`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateBookingResponse {
    pub bookingid: i64,
    pub booking: Booking,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingIdItem {
    pub bookingid: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartialBookingDates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout: Option<String>,
}

/// Request payload for `PATCH /booking/{id}`. Only the fields present are
/// applied; omitted fields keep their stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartialUpdateBookingRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totalprice: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depositpaid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookingdates: Option<PartialBookingDates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additionalneeds: Option<String>,
}

/// Filters accepted by `GET /booking`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingSearchQuery {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub checkin: Option<String>,
    pub checkout: Option<String>,
}

impl BookingSearchQuery {
    pub(crate) fn pairs(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("firstname", self.firstname.as_deref()),
            ("lastname", self.lastname.as_deref()),
            ("checkin", self.checkin.as_deref()),
            ("checkout", self.checkout.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /auth`. The service answers bad credentials with `200` and a
/// `reason` instead of a token.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
