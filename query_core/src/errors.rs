//! Error types for query building, execution and mapping

use thiserror::Error;

/// Failure reported by a query executor
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Statement timed out after {0} ms")]
    Timeout(u64),

    #[error("Unknown relation: {0}")]
    UnknownRelation(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Not supported by this executor: {0}")]
    Unsupported(String),

    #[error("Cannot decode column '{column}' of type {type_name}")]
    Decode { column: String, type_name: String },
}

/// Failure of a list query or of result mapping
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Mapping target must be a present sequence")]
    TargetNotSequenceRef,

    #[error("Source element type {0} is not a record")]
    SourceNotRecord(String),

    #[error("Target element type {0} is not a record")]
    TargetNotRecord(String),

    #[error("Sort field not allowed: {0}")]
    SortFieldNotAllowed(String),

    #[error("Invalid join table: {0}")]
    JoinConditionInvalid(String),

    #[error("Count query failed: {0}")]
    CountFailed(#[source] StoreError),

    #[error("Query execution failed: {0}")]
    QueryExecutionFailed(#[source] StoreError),

    #[error("Query builder used before build()")]
    BuilderNotInitialized,
}
