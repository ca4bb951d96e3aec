//! Convenience re-exports for common query-core usage

// Records
pub use crate::record::{DynRecord, FieldType, Mappable, Record, RecordShape};
pub use record_derive::{model, Record};

// Error types
pub use crate::errors::{QueryError, StoreError};

// Query building
pub use crate::query_builder::{
    JoinCondition, JoinType, Options, PageInfo, QueryBuilder, QueryFilter, SortField, SortOrder,
};

// Execution
pub use crate::executor::{MemoryExecutor, PgExecutor, QueryContext, QueryExecutor, Row};

// Mapping
pub use crate::mapper::{map_records, ExcludeSet};
pub use cache_system::FieldMapCache;

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use type_mapping::FieldValue;
