//! Small parsing helpers shared by the adapters.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Parses the timestamp formats the upstreams actually emit: unix seconds,
/// unix milliseconds, RFC 3339, and a couple of bare datetime layouts.
/// Naive datetimes are taken as UTC.
#[must_use]
pub fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::Number(n) => {
            let raw = n.as_f64()?;
            let millis = if raw > 1e12 { raw } else { raw * 1000.0 };
            Utc.timestamp_millis_opt(millis as i64).single()
        }
        serde_json::Value::String(s) => parse_timestamp_str(s),
        _ => None,
    }
}

/// String-only variant of [`parse_timestamp`].
#[must_use]
pub fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim().trim_end_matches('Z');

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw.trim()) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    None
}

/// Splits a combined event name into its two team strings.
///
/// Tries the provider's own separator first, then the usual suspects.
#[must_use]
pub fn split_teams(name: &str, separator: &str) -> Option<(String, String)> {
    let candidates = [separator, " - ", " vs ", " v ", " @ "];
    for sep in candidates {
        if sep.is_empty() {
            continue;
        }
        if let Some((left, right)) = name.split_once(sep) {
            let left = left.trim();
            let right = right.trim();
            if !left.is_empty() && !right.is_empty() {
                return Some((left.to_string(), right.to_string()));
            }
        }
    }
    None
}
