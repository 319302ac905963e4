//! Clock helpers
//!
//! Timestamps are Unix nanoseconds internally; trade records and wire
//! responses carry RFC 3339 strings.

use chrono::{DateTime, SecondsFormat, Utc};

/// Current wall time in Unix nanoseconds.
pub fn now_ns() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

/// Current wall time as an RFC 3339 string with nanosecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Format Unix nanoseconds as RFC 3339.
pub fn ns_to_iso(ns: i64) -> String {
    DateTime::<Utc>::from_timestamp_nanos(ns).to_rfc3339_opts(SecondsFormat::Nanos, true)
}
