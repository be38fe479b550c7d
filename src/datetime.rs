//! Timestamp field recognition and normalization.
//!
//! The metadata API marks timestamp semantics by field name, not by value
//! shape, so recognition is a substring match against a fixed allow-list.
//! The match is deliberately loose: `datasource.updatedAt` qualifies
//! because it contains `updatedAt`, related to timestamps or not. That
//! over-match is part of the contract. It is also case-sensitive, so
//! `xCreatedAtY` does not qualify (no allow-list entry appears in it
//! verbatim).

use crate::config::ParseConfig;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Whether a cleaned field name denotes a timestamp.
///
/// Case-sensitive substring match against the configured allow-list.
pub fn is_datetime_field(clean_name: &str, config: &ParseConfig) -> bool {
    config
        .datetime_fields
        .iter()
        .any(|candidate| clean_name.contains(candidate.as_str()))
}

/// Normalize a timestamp value to an RFC 3339 UTC string.
///
/// An absent or empty source value becomes an explicit null, never an
/// epoch default. Strings that don't parse as timestamps, and non-string
/// values, pass through unchanged and fall out in type inference.
pub fn normalize_datetime(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::String(s) if s.is_empty() => Value::Null,
        Value::String(s) => match parse_timestamp(s) {
            Some(instant) => {
                Value::String(instant.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            None => value.clone(),
        },
        _ => value.clone(),
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    // Full RFC 3339 with offset, the shape the metadata API emits.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // ISO datetime without an offset; treat as UTC.
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    // Bare date: midnight UTC.
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}
