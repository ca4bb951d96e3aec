//! Query Core - list query building and record mapping for listquery
//!
//! This crate provides the record abstraction generated by `#[derive(Record)]`,
//! the staged list query builder, the executors that run its statements and
//! the dynamic mapper that projects results onto other record shapes.

// Generated code refers to `query_core::...`, including inside this crate's tests
extern crate self as query_core;

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod errors;
pub mod executor;
pub mod mapper;
pub mod prelude;
pub mod query_builder;
pub mod record;
pub mod validation;

pub use errors::{QueryError, StoreError};
pub use executor::{MemoryExecutor, PgExecutor, QueryContext, QueryExecutor, Row};
pub use mapper::{map_fields, map_records, ExcludeSet, TargetSequence};
pub use query_builder::{
    JoinCondition, JoinType, Options, PageInfo, PaginationPolicy, QueryBuilder, QueryFilter,
    SortField, SortOrder,
};
pub use record::{DynRecord, FieldType, Mappable, Record, RecordShape};
pub use record_derive::{model, Record};
pub use validation::{ValidatedJoinTable, ValidationError};

// Used by code generated from `#[derive(Record)]`
pub use serde_json;
pub use type_mapping;
pub use type_mapping::FieldValue;

use sqlx::PgPool;

pub type DbPool = PgPool;
