//! Text coercions
//!
//! Conversions applied when a value cannot be assigned to a field directly
//! and the field holds text.

use crate::types::FieldValue;
use chrono::{DateTime, SecondsFormat, Utc};

/// Render a timestamp as RFC 3339 with whole seconds and a `Z` suffix for UTC
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Shortest representation that parses back to the same `f64`
pub fn format_float(value: f64) -> String {
    value.to_string()
}

/// Text form of an integer, float or timestamp value. Every other kind
/// yields `None` and is left to the caller to skip.
pub fn coerce_to_text(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Integer(i) => Some(i.to_string()),
        FieldValue::Unsigned(u) => Some(u.to_string()),
        FieldValue::Real(f) => Some(f.to_string()),
        FieldValue::Float(f) => Some(format_float(*f)),
        FieldValue::Timestamp(ts) => Some(format_timestamp(ts)),
        _ => None,
    }
}
