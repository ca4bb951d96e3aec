//! Dynamic field values shared across the listquery ecosystem
//!
//! Records expose their fields as [`FieldValue`]s; the query layer binds them as
//! statement parameters, the executors decode rows into them and the mapper
//! moves them between record shapes.

pub mod coerce;
pub mod sql;
pub mod types;

pub use coerce::{coerce_to_text, format_float, format_timestamp};
pub use sql::{pg_type_to_value_kind, ValueKind};
pub use types::FieldValue;
