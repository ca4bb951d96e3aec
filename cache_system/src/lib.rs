//! Cache system for field-map correspondence tables
//!
//! This crate provides the process-wide, concurrency-safe cache that stores
//! source-to-target field tables built by the record mapper.

pub mod field_map;
pub mod field_map_cache;
pub mod prelude;

pub use field_map::FieldMap;
pub use field_map_cache::FieldMapCache;
