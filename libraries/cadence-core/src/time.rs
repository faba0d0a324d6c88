//! Timestamp handling
//!
//! The catalogue stores instants as UTC text in SQLite's native
//! `datetime()` layout so that lexical and chronological order agree.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Storage layout for every timestamp column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format an instant the way the catalogue stores it
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a user- or database-supplied instant.
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00Z`), the storage layout
/// (`2024-05-01 10:00:00`) and a bare calendar date (`2024-05-01`, read as
/// midnight UTC).
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Some(instant.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(input, TIMESTAMP_FORMAT) {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
