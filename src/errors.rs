//! Error types for the listquery crate
//!
//! Query-level failures are reported as [`query_core::QueryError`]; this
//! module covers setting up the connection and loading configuration.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListQueryError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Query error: {0}")]
    Query(#[from] query_core::QueryError),
}
