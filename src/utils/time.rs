//! Time and timestamp utilities

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::warn;

/// Get current Unix timestamp in seconds
pub fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Render a UTC instant the way every record stores it (`2024-01-15T10:00:00.000Z`)
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a client-supplied timestamp
///
/// Accepts RFC 3339 with any offset, and naive `YYYY-MM-DDTHH:MM:SS[.fff]`
/// which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Normalize a JSON timestamp value, `None` if it is not a usable time
pub fn normalize_client_timestamp(value: &Value) -> Option<String> {
    value.as_str().and_then(parse_timestamp).map(format_timestamp)
}

/// Pick the event time for a record, falling back to its receive time
///
/// A missing or unusable client value is not an error. The record keeps
/// `received_at` and a warning names the stream it came from.
pub fn resolve_client_timestamp(value: Option<&Value>, received_at: &str, stream: &str) -> String {
    match value {
        Some(raw) => match normalize_client_timestamp(raw) {
            Some(timestamp) => timestamp,
            None => {
                warn!(
                    stream,
                    client_timestamp = %raw,
                    fallback = received_at,
                    "unparsable client timestamp, using receive time"
                );
                received_at.to_string()
            }
        },
        None => {
            warn!(stream, fallback = received_at, "missing client timestamp, using receive time");
            received_at.to_string()
        }
    }
}

/// Partition key for a calendar date (`YYYY-MM-DD`)
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
