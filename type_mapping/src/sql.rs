//! PostgreSQL type mapping
//!
//! This module maps PostgreSQL column type names, as reported by the driver,
//! to the value kind used when decoding a column.

/// Decoding strategy for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Float,
    Text,
    Uuid,
    Timestamp,
    NaiveTimestamp,
    Json,
}

/// Map a PostgreSQL type name (`INT4`, `TIMESTAMPTZ`, ...) to a value kind
pub fn pg_type_to_value_kind(pg_type: &str) -> Option<ValueKind> {
    match pg_type.to_ascii_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => Some(ValueKind::Boolean),
        "INT2" | "SMALLINT" | "SMALLSERIAL" => Some(ValueKind::SmallInt),
        "INT4" | "INTEGER" | "SERIAL" => Some(ValueKind::Integer),
        "INT8" | "BIGINT" | "BIGSERIAL" => Some(ValueKind::BigInt),
        "FLOAT4" | "REAL" => Some(ValueKind::Real),
        "FLOAT8" | "DOUBLE PRECISION" => Some(ValueKind::Float),
        "TEXT" | "VARCHAR" | "BPCHAR" | "CHAR" | "NAME" | "CITEXT" => Some(ValueKind::Text),
        "UUID" => Some(ValueKind::Uuid),
        "TIMESTAMPTZ" => Some(ValueKind::Timestamp),
        "TIMESTAMP" => Some(ValueKind::NaiveTimestamp),
        "JSON" | "JSONB" => Some(ValueKind::Json),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_type_names() {
        assert_eq!(pg_type_to_value_kind("INT4"), Some(ValueKind::Integer));
        assert_eq!(pg_type_to_value_kind("int8"), Some(ValueKind::BigInt));
        assert_eq!(pg_type_to_value_kind("TIMESTAMPTZ"), Some(ValueKind::Timestamp));
        assert_eq!(pg_type_to_value_kind("JSONB"), Some(ValueKind::Json));
        assert_eq!(pg_type_to_value_kind("VARCHAR"), Some(ValueKind::Text));
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(pg_type_to_value_kind("TSVECTOR"), None);
    }
}
