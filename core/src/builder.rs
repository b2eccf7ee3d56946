//! Builder for valid booking payloads.
//!
//! # Design
//! The builder owns a draft `Booking` seeded with values the service accepts.
//! Setters mutate the draft and return `&mut Self` so they chain, and
//! `build()` hands out an owned copy: later changes to the builder or to a
//! previously built payload never leak into each other.

use rand::Rng;

use crate::dates::{iso_date_plus_days, iso_date_today};
use crate::types::{Booking, BookingDates};

const ALPHA: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone)]
pub struct BookingRequestBuilder {
    draft: Booking,
}

impl Default for BookingRequestBuilder {
    /// John Doe, 123, deposit paid, checking in today for three nights, with
    /// breakfast.
    fn default() -> Self {
        Self {
            draft: Booking {
                firstname: "John".to_string(),
                lastname: "Doe".to_string(),
                totalprice: 123,
                depositpaid: true,
                bookingdates: BookingDates {
                    checkin: iso_date_today(),
                    checkout: iso_date_plus_days(3),
                },
                additionalneeds: Some("Breakfast".to_string()),
            },
        }
    }
}

impl BookingRequestBuilder {
    pub fn build(&self) -> Booking {
        self.draft.clone()
    }

    pub fn with_first_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.draft.firstname = name.into();
        self
    }

    pub fn with_last_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.draft.lastname = name.into();
        self
    }

    pub fn with_total_price(&mut self, price: i64) -> &mut Self {
        self.draft.totalprice = price;
        self
    }

    pub fn with_deposit_paid(&mut self, paid: bool) -> &mut Self {
        self.draft.depositpaid = paid;
        self
    }

    pub fn with_dates(&mut self, checkin: impl Into<String>, checkout: impl Into<String>) -> &mut Self {
        self.draft.bookingdates = BookingDates {
            checkin: checkin.into(),
            checkout: checkout.into(),
        };
        self
    }

    /// `None` removes `additionalneeds` from subsequent builds.
    pub fn with_additional_needs<S: Into<String>>(&mut self, needs: Option<S>) -> &mut Self {
        self.draft.additionalneeds = needs.map(Into::into);
        self
    }

    /// Replace the names with `Test<suffix>` / `User<xxxx>` and pick a price
    /// in `50..=500`. A seed fixes the first-name suffix.
    pub fn with_random_names(&mut self, seed: Option<&str>) -> &mut Self {
        let mut rng = rand::rng();
        let suffix = match seed {
            Some(seed) => seed.to_lowercase(),
            None => random_alpha(&mut rng, 5),
        };
        self.draft.firstname = format!("Test{suffix}");
        self.draft.lastname = format!("User{}", random_alpha(&mut rng, 4));
        self.draft.totalprice = rng.random_range(50..=500);
        self
    }
}

fn random_alpha<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ALPHA[rng.random_range(0..ALPHA.len())] as char)
        .collect()
}
