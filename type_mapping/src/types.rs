//! Dynamic value definitions
//!
//! This module provides the runtime value used for record fields,
//! statement parameters and decoded row columns.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Unsigned(u64),
    Real(f32),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(chrono::DateTime<chrono::Utc>),
    Json(serde_json::Value),
    /// Nested record, tagged with the Rust type name it was produced from
    Record {
        type_name: String,
        fields: Vec<(String, FieldValue)>,
    },
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn is_record(&self) -> bool {
        matches!(self, FieldValue::Record { .. })
    }

    /// Short variant name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::Unsigned(_) => "unsigned",
            FieldValue::Real(_) => "real",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
            FieldValue::Uuid(_) => "uuid",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Json(_) => "json",
            FieldValue::Record { .. } => "record",
        }
    }

    /// Integer view of the value, if it holds an integer that fits in `i128`
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            FieldValue::Integer(i) => Some(*i as i128),
            FieldValue::Unsigned(u) => Some(*u as i128),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Real(f) => Some(*f as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Unsigned(u) => Some(*u as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Ordering used by in-process sorting. Nulls sort first; values of
    /// unrelated kinds are incomparable.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => Some(Ordering::Equal),
            (FieldValue::Null, _) => Some(Ordering::Less),
            (_, FieldValue::Null) => Some(Ordering::Greater),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => Some(a.cmp(b)),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_i128(), b.as_i128()) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => match (a.as_f64(), b.as_f64()) {
                    (Some(x), Some(y)) => x.partial_cmp(&y),
                    _ => None,
                },
            },
        }
    }

    /// Equality across numeric widths, used when matching predicates
    pub fn loosely_equals(&self, other: &FieldValue) -> bool {
        self == other || self.compare(other) == Some(Ordering::Equal) && !self.is_null()
    }
}

impl FieldValue {
    /// JSON form of the value. Timestamps render as RFC 3339, records as objects.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Integer(i) => Value::from(*i),
            FieldValue::Unsigned(u) => Value::from(*u),
            FieldValue::Real(f) => Value::from(*f as f64),
            FieldValue::Float(f) => Value::from(*f),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Uuid(u) => Value::String(u.to_string()),
            FieldValue::Timestamp(ts) => Value::String(crate::coerce::format_timestamp(ts)),
            FieldValue::Json(v) => v.clone(),
            FieldValue::Record { fields, .. } => Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }

    /// Scalar JSON values become their natural variant; arrays and objects stay JSON
    pub fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Boolean(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    FieldValue::Unsigned(u)
                } else {
                    FieldValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => FieldValue::Text(s),
            other => FieldValue::Json(other),
        }
    }
}

impl From<String> for FieldValue {
    fn from(val: String) -> Self {
        FieldValue::Text(val)
    }
}

impl From<&str> for FieldValue {
    fn from(val: &str) -> Self {
        FieldValue::Text(val.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(val: bool) -> Self {
        FieldValue::Boolean(val)
    }
}

impl From<i16> for FieldValue {
    fn from(val: i16) -> Self {
        FieldValue::Integer(val as i64)
    }
}

impl From<i32> for FieldValue {
    fn from(val: i32) -> Self {
        FieldValue::Integer(val as i64)
    }
}

impl From<i64> for FieldValue {
    fn from(val: i64) -> Self {
        FieldValue::Integer(val)
    }
}

impl From<u32> for FieldValue {
    fn from(val: u32) -> Self {
        FieldValue::Unsigned(val as u64)
    }
}

impl From<u64> for FieldValue {
    fn from(val: u64) -> Self {
        FieldValue::Unsigned(val)
    }
}

impl From<f32> for FieldValue {
    fn from(val: f32) -> Self {
        FieldValue::Real(val)
    }
}

impl From<f64> for FieldValue {
    fn from(val: f64) -> Self {
        FieldValue::Float(val)
    }
}

impl From<Uuid> for FieldValue {
    fn from(val: Uuid) -> Self {
        FieldValue::Uuid(val)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for FieldValue {
    fn from(val: chrono::DateTime<chrono::Utc>) -> Self {
        FieldValue::Timestamp(val)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(val: serde_json::Value) -> Self {
        FieldValue::Json(val)
    }
}

impl<T> From<Option<T>> for FieldValue
where
    T: Into<FieldValue>,
{
    fn from(val: Option<T>) -> Self {
        match val {
            Some(v) => v.into(),
            None => FieldValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_across_integer_widths() {
        assert_eq!(
            FieldValue::Integer(3).compare(&FieldValue::Unsigned(3)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            FieldValue::Integer(-1).compare(&FieldValue::Unsigned(0)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_nulls_sort_first() {
        assert_eq!(
            FieldValue::Null.compare(&FieldValue::Text("a".into())),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_incomparable_kinds() {
        assert_eq!(
            FieldValue::Text("1".into()).compare(&FieldValue::Integer(1)),
            None
        );
    }

    #[test]
    fn test_loose_equality() {
        assert!(FieldValue::Integer(7).loosely_equals(&FieldValue::Unsigned(7)));
        assert!(FieldValue::Real(0.5).loosely_equals(&FieldValue::Float(0.5)));
        assert!(!FieldValue::Null.loosely_equals(&FieldValue::Integer(0)));
    }

    #[test]
    fn test_json_round_trip_of_scalars() {
        let value = serde_json::json!({"id": 1, "name": "a", "score": 1.5, "ok": true});
        let obj = value.as_object().unwrap();
        assert_eq!(FieldValue::from_json(obj["id"].clone()), FieldValue::Integer(1));
        assert_eq!(FieldValue::from_json(obj["name"].clone()), FieldValue::Text("a".into()));
        assert_eq!(FieldValue::from_json(obj["score"].clone()), FieldValue::Float(1.5));
        assert_eq!(FieldValue::from_json(obj["ok"].clone()), FieldValue::Boolean(true));
        assert!(matches!(FieldValue::from_json(value.clone()), FieldValue::Json(_)));
    }

    #[test]
    fn test_record_to_json_object() {
        let record = FieldValue::Record {
            type_name: "app::Order".into(),
            fields: vec![
                ("id".into(), FieldValue::Integer(9)),
                ("note".into(), FieldValue::Null),
            ],
        };
        assert_eq!(record.to_json(), serde_json::json!({"id": 9, "note": null}));
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(FieldValue::from(None::<i32>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some("x")), FieldValue::Text("x".into()));
    }
}
