// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time storage.
//!
//! Timestamps are persisted as fixed-width RFC3339 text (microseconds, `Z`
//! suffix) so that ordering the column as text orders it chronologically.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current time truncated to the precision we store.
pub fn now() -> DateTime<Utc> {
    // Round-tripping through the storage format keeps in-memory values equal
    // to what a later read returns.
    let now = Utc::now();
    parse_timestamp(&format_timestamp(now)).unwrap_or(now)
}

/// Format a UTC timestamp for storage.
pub fn format_timestamp(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a calendar date for storage (`YYYY-MM-DD`).
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}
