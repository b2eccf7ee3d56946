//! ISO calendar dates in UTC, as the booking service expects them.

use chrono::{NaiveDate, TimeDelta, Utc};

fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Today's date (UTC) as `YYYY-MM-DD`.
pub fn iso_date_today() -> String {
    format_iso(today_utc())
}

/// Today's date (UTC) shifted by `days`, as `YYYY-MM-DD`. Out-of-range shifts
/// clamp to today.
pub fn iso_date_plus_days(days: i64) -> String {
    let today = today_utc();
    let shifted = TimeDelta::try_days(days)
        .and_then(|delta| today.checked_add_signed(delta))
        .unwrap_or(today);
    format_iso(shifted)
}
