//! Conversions between Rust field types and [`FieldValue`]

use super::DynRecord;
use std::any::TypeId;
use chrono::{DateTime, Utc};
use type_mapping::FieldValue;
use uuid::Uuid;

/// A type that can be stored in a record field
///
/// `from_field_value` decodes store values: it accepts a value only when it is
/// representable in `Self` without formatting (integers convert between widths
/// when the value fits, floats widen). Anything else yields `None`.
pub trait FieldType: Sized + 'static {
    fn to_field_value(&self) -> FieldValue;

    /// Identity of the stored type with `Option`/`Box` wrappers removed; the
    /// mapper only assigns directly between fields of the same base type
    fn base_type_id() -> TypeId {
        TypeId::of::<Self>()
    }

    fn from_field_value(value: FieldValue) -> Option<Self>;

    /// Decode from JSON. Text-encoded timestamps and UUIDs are accepted here
    /// since JSON has no native form for them.
    fn from_json_value(value: serde_json::Value) -> Option<Self> {
        Self::from_field_value(FieldValue::from_json(value))
    }

    fn as_record(&self) -> Option<&dyn DynRecord> {
        None
    }

    fn as_record_mut(&mut self) -> Option<&mut dyn DynRecord> {
        None
    }
}

macro_rules! integer_field_type {
    ($($t:ty),* $(,)?) => {
        $(
            impl FieldType for $t {
                fn to_field_value(&self) -> FieldValue {
                    FieldValue::from(*self)
                }

                fn from_field_value(value: FieldValue) -> Option<Self> {
                    value.as_i128().and_then(|v| <$t>::try_from(v).ok())
                }
            }
        )*
    };
}

integer_field_type!(i16, i32, i64, u32, u64);

impl FieldType for bool {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Boolean(*self)
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Boolean(b) => Some(b),
            _ => None,
        }
    }
}

impl FieldType for f32 {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Real(*self)
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Real(f) => Some(f),
            FieldValue::Float(f) if (f as f32) as f64 == f => Some(f as f32),
            _ => None,
        }
    }

    fn from_json_value(value: serde_json::Value) -> Option<Self> {
        value.as_f64().map(|f| f as f32)
    }
}

impl FieldType for f64 {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Float(f) => Some(f),
            FieldValue::Real(f) => Some(f as f64),
            _ => None,
        }
    }

    fn from_json_value(value: serde_json::Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FieldType for String {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl FieldType for DateTime<Utc> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Timestamp(*self)
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    fn from_json_value(value: serde_json::Value) -> Option<Self> {
        let text = value.as_str()?;
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| {
                // json_agg renders `timestamp` columns without an offset
                chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }
}

impl FieldType for Uuid {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Uuid(*self)
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Uuid(u) => Some(u),
            _ => None,
        }
    }

    fn from_json_value(value: serde_json::Value) -> Option<Self> {
        value.as_str().and_then(|s| Uuid::parse_str(s).ok())
    }
}

impl FieldType for serde_json::Value {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Json(self.clone())
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Json(v) => Some(v),
            _ => None,
        }
    }

    fn from_json_value(value: serde_json::Value) -> Option<Self> {
        Some(value)
    }
}

impl<T: FieldType> FieldType for Option<T> {
    fn to_field_value(&self) -> FieldValue {
        match self {
            Some(value) => value.to_field_value(),
            None => FieldValue::Null,
        }
    }

    fn base_type_id() -> TypeId {
        T::base_type_id()
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Null => Some(None),
            other => T::from_field_value(other).map(Some),
        }
    }

    fn from_json_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(None),
            other => T::from_json_value(other).map(Some),
        }
    }

    fn as_record(&self) -> Option<&dyn DynRecord> {
        self.as_ref().and_then(T::as_record)
    }

    fn as_record_mut(&mut self) -> Option<&mut dyn DynRecord> {
        self.as_mut().and_then(T::as_record_mut)
    }
}

impl<T: FieldType> FieldType for Box<T> {
    fn to_field_value(&self) -> FieldValue {
        self.as_ref().to_field_value()
    }

    fn base_type_id() -> TypeId {
        T::base_type_id()
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        T::from_field_value(value).map(Box::new)
    }

    fn from_json_value(value: serde_json::Value) -> Option<Self> {
        T::from_json_value(value).map(Box::new)
    }

    fn as_record(&self) -> Option<&dyn DynRecord> {
        self.as_ref().as_record()
    }

    fn as_record_mut(&mut self) -> Option<&mut dyn DynRecord> {
        self.as_mut().as_record_mut()
    }
}

/// Sequences travel as JSON arrays, which is also how aggregated relation
/// rows arrive from the store.
impl<T: FieldType> FieldType for Vec<T> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Json(serde_json::Value::Array(
            self.iter().map(|item| item.to_field_value().to_json()).collect(),
        ))
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Json(json) => Self::from_json_value(json),
            FieldValue::Null => Some(Vec::new()),
            _ => None,
        }
    }

    fn from_json_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Array(items) => items.into_iter().map(T::from_json_value).collect(),
            serde_json::Value::Null => Some(Vec::new()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_integer_widths_convert_when_value_fits() {
        assert_eq!(i32::from_field_value(FieldValue::Integer(30)), Some(30));
        assert_eq!(i16::from_field_value(FieldValue::Integer(70_000)), None);
        assert_eq!(u32::from_field_value(FieldValue::Integer(-1)), None);
        assert_eq!(i64::from_field_value(FieldValue::Unsigned(5)), Some(5));
    }

    #[test]
    fn test_no_cross_family_assignment() {
        assert_eq!(String::from_field_value(FieldValue::Integer(1)), None);
        assert_eq!(f64::from_field_value(FieldValue::Integer(1)), None);
        assert_eq!(i64::from_field_value(FieldValue::Text("1".into())), None);
    }

    #[test]
    fn test_real_widens_to_float() {
        assert_eq!(f64::from_field_value(FieldValue::Real(0.5)), Some(0.5));
        assert_eq!(f32::from_field_value(FieldValue::Float(0.5)), Some(0.5));
        assert_eq!(f32::from_field_value(FieldValue::Float(0.1)), None);
    }

    #[test]
    fn test_base_type_ignores_option_and_box() {
        assert_eq!(Option::<i64>::base_type_id(), i64::base_type_id());
        assert_eq!(Box::<Option<String>>::base_type_id(), String::base_type_id());
        assert_ne!(i16::base_type_id(), i64::base_type_id());
        assert_ne!(Vec::<i64>::base_type_id(), i64::base_type_id());
    }

    #[test]
    fn test_option_accepts_null() {
        assert_eq!(Option::<i64>::from_field_value(FieldValue::Null), Some(None));
        assert_eq!(
            Option::<String>::from_field_value(FieldValue::Text("x".into())),
            Some(Some("x".to_string()))
        );
    }

    #[test]
    fn test_timestamp_from_json_text() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            DateTime::<Utc>::from_json_value(serde_json::json!("2024-01-02T03:04:05Z")),
            Some(expected)
        );
        assert_eq!(
            DateTime::<Utc>::from_json_value(serde_json::json!("2024-01-02T03:04:05")),
            Some(expected)
        );
        assert_eq!(
            DateTime::<Utc>::from_field_value(FieldValue::Text("2024-01-02T03:04:05Z".into())),
            None
        );
    }

    #[test]
    fn test_vec_from_json_array() {
        let value = FieldValue::Json(serde_json::json!([1, 2, 3]));
        assert_eq!(Vec::<i32>::from_field_value(value), Some(vec![1, 2, 3]));
        assert_eq!(
            Vec::<i32>::from_field_value(FieldValue::Json(serde_json::json!(["a"]))),
            None
        );
    }
}
