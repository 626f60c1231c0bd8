//! Time utilities for published match records

use chrono::{SecondsFormat, TimeZone, Utc};

/// Fallback for timestamps chrono cannot represent
pub const EPOCH_ISO: &str = "1970-01-01T00:00:00.000Z";

/// Convert a Unix timestamp (seconds) to an ISO 8601 UTC string with milliseconds
///
/// Returns the epoch for out-of-range timestamps.
///
/// # Examples
/// ```
/// use sys_marker_scan::utils::time::timestamp_to_iso8601;
/// assert_eq!(timestamp_to_iso8601(0), "1970-01-01T00:00:00.000Z");
/// assert_eq!(timestamp_to_iso8601(1704067200), "2024-01-01T00:00:00.000Z");
/// ```
pub fn timestamp_to_iso8601(timestamp: i64) -> String {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| EPOCH_ISO.to_string())
}
