//! Display helpers for instants shared by the summary, list, and CLI layers.
//!
//! Duration formatting lives with its parser in [`crate::parse::duration`]
//! so the round-trip contract stays in one place.

use chrono::NaiveDateTime;

/// Compact instant: `250301T0800`.
#[must_use]
pub fn format_dt(dt: NaiveDateTime) -> String {
    dt.format("%y%m%dT%H%M").to_string()
}

/// Long instant, 24-hour or 12-hour per the `ampm` display setting:
/// `2025-03-01 14:30` or `2025-03-01 2:30pm`.
#[must_use]
pub fn format_dt_long(dt: NaiveDateTime, ampm: bool) -> String {
    if ampm {
        let time = dt.format("%-I:%M%p").to_string().to_ascii_lowercase();
        format!("{} {time}", dt.format("%Y-%m-%d"))
    } else {
        dt.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Date column for list rows: `25-03-01`.
#[must_use]
pub fn format_date(dt: NaiveDateTime) -> String {
    dt.format("%y-%m-%d").to_string()
}
