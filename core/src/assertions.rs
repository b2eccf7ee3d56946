//! Domain-aware test assertions.
//!
//! These panic like `assert!` and point at the caller. Booking comparisons
//! go field by field rather than through `==` so a failure names the field
//! that differs; response checks include status and a body snippet.

use serde::Serialize;

use crate::response::HttpResponse;
use crate::types::{Booking, PartialUpdateBookingRequest};

#[track_caller]
pub fn expect_booking_matches_request(actual: &Booking, expected: &Booking) {
    assert_eq!(actual.firstname, expected.firstname, "firstname");
    assert_eq!(actual.lastname, expected.lastname, "lastname");
    assert_eq!(actual.totalprice, expected.totalprice, "totalprice");
    assert_eq!(actual.depositpaid, expected.depositpaid, "depositpaid");
    assert_eq!(
        actual.bookingdates.checkin, expected.bookingdates.checkin,
        "bookingdates.checkin"
    );
    assert_eq!(
        actual.bookingdates.checkout, expected.bookingdates.checkout,
        "bookingdates.checkout"
    );
    match &expected.additionalneeds {
        None => assert!(
            actual.additionalneeds.is_none(),
            "additionalneeds should be absent, got {:?}",
            actual.additionalneeds
        ),
        Some(needs) => assert_eq!(actual.additionalneeds.as_ref(), Some(needs), "additionalneeds"),
    }
}

/// Check only the fields the patch sets.
#[track_caller]
pub fn expect_booking_contains_patch(actual: &Booking, patch: &PartialUpdateBookingRequest) {
    if let Some(firstname) = &patch.firstname {
        assert_eq!(&actual.firstname, firstname, "firstname");
    }
    if let Some(lastname) = &patch.lastname {
        assert_eq!(&actual.lastname, lastname, "lastname");
    }
    if let Some(totalprice) = patch.totalprice {
        assert_eq!(actual.totalprice, totalprice, "totalprice");
    }
    if let Some(depositpaid) = patch.depositpaid {
        assert_eq!(actual.depositpaid, depositpaid, "depositpaid");
    }
    if let Some(needs) = &patch.additionalneeds {
        assert_eq!(actual.additionalneeds.as_ref(), Some(needs), "additionalneeds");
    }
    if let Some(dates) = &patch.bookingdates {
        if let Some(checkin) = &dates.checkin {
            assert_eq!(&actual.bookingdates.checkin, checkin, "bookingdates.checkin");
        }
        if let Some(checkout) = &dates.checkout {
            assert_eq!(&actual.bookingdates.checkout, checkout, "bookingdates.checkout");
        }
    }
}

fn failure_message<T: Serialize>(response: &HttpResponse<T>, context: Option<&str>) -> String {
    let prefix = context.map(|c| format!("{c}: ")).unwrap_or_default();
    let snippet = response.snippet();
    let mut message = format!("{prefix}{} {}", response.status, response.status_text);
    if !snippet.is_empty() {
        message.push('\n');
        message.push_str(&snippet);
    }
    message
}

#[track_caller]
pub fn expect_response_ok<T: Serialize>(response: &HttpResponse<T>, context: Option<&str>) {
    if !response.ok {
        panic!("expected ok response, got {}", failure_message(response, context));
    }
}

/// Not ok, and specifically a 4xx/5xx.
#[track_caller]
pub fn expect_response_not_ok<T: Serialize>(response: &HttpResponse<T>, context: Option<&str>) {
    if response.ok || response.status < 400 {
        panic!("expected failing response, got {}", failure_message(response, context));
    }
}

/// Chainable response checks.
pub trait ResponseAssertions {
    fn assert_ok(&self, context: &str) -> &Self;
    fn assert_not_ok(&self, context: &str) -> &Self;
    fn assert_status(&self, expected: u16) -> &Self;
}

impl<T: Serialize> ResponseAssertions for HttpResponse<T> {
    #[track_caller]
    fn assert_ok(&self, context: &str) -> &Self {
        expect_response_ok(self, Some(context));
        self
    }

    #[track_caller]
    fn assert_not_ok(&self, context: &str) -> &Self {
        expect_response_not_ok(self, Some(context));
        self
    }

    #[track_caller]
    fn assert_status(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {expected}, got {}",
            failure_message(self, None)
        );
        self
    }
}
