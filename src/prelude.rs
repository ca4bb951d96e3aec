//! Convenience re-exports for common listquery usage
//!
//! # Example
//!
//! ```rust
//! use listquery::prelude::*;
//!
//! // Records, the query builder, executors and config types are now in scope
//! ```

// Core listquery components
pub use crate::core::ListQuery;
pub use crate::errors::ListQueryError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, QueryConfig};

// Re-export commonly used query-core types for convenience
pub use query_core::prelude::*;

// Re-export query_core module for derive-generated code
pub use query_core;

// Re-export cache system
pub use cache_system::prelude::*;

// Common external dependencies
pub use anyhow;
pub use async_trait;
pub use sqlx;
pub use tokio;

// Commonly used value types
pub use chrono::{DateTime, Utc};
pub use sqlx::PgPool;
pub use uuid::Uuid;
