//! # listquery
//!
//! Generic paginated list queries for PostgreSQL: one count and one select per
//! request, with model-derived filters, fuzzy search, joins, preloads and
//! allow-listed sorting. Results can be mapped onto independently declared
//! view records with a cached field correspondence.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use listquery::prelude::*;
//!
//! #[model]
//! #[record(table = "users")]
//! pub struct User {
//!     pub id: i64,
//!     pub name: String,
//!     pub email: Option<String>,
//! }
//!
//! #[model]
//! pub struct UserRow {
//!     pub id: String,
//!     pub name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::new(
//!         "localhost".to_string(), 5432, "listquery".to_string(),
//!         "postgres".to_string(), "password".to_string(),
//!         1, 5, 30, 600, 3600,
//!     );
//!     let listquery = ListQuery::new(config).await?;
//!
//!     let options = listquery
//!         .options()
//!         .page_info(PageInfo::new(1, 20).with_key("jo").with_order("name:desc"))
//!         .likes(&["name", "email"])
//!         .allowed_sorts(&["name", "id"]);
//!
//!     let mut rows: Vec<UserRow> = Vec::new();
//!     let total = listquery
//!         .query(User::default(), options)
//!         .build()
//!         .await
//!         .map_to_target(&mut rows, &[])
//!         .await?;
//!
//!     println!("{} of {} users", rows.len(), total);
//!     Ok(())
//! }
//! ```

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

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::ListQuery;
pub use errors::ListQueryError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, QueryConfig};

// Re-export internal crates used by macros and public API
// These MUST be public for the generated derive code to resolve `query_core::...`
pub use cache_system;
pub use query_core;
pub use record_derive;
pub use type_mapping;

// Re-export external dependencies used in public API
pub use async_trait;
pub use sqlx;
