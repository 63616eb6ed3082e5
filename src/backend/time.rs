//! Timestamp storage helpers
//!
//! Timestamps are stored as fixed-width RFC3339 TEXT (microsecond
//! precision, `Z` suffix) so lexicographic ordering in SQL matches
//! chronological ordering.

use chrono::{DateTime, SecondsFormat, Utc};

/// Current time, formatted for storage
pub(crate) fn now_db() -> String {
    to_db(Utc::now())
}

/// Format a timestamp for storage
pub(crate) fn to_db(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp. Malformed values fall back to the current
/// time rather than failing the whole read.
pub(crate) fn from_db(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
