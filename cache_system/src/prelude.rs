//! Convenience re-exports for common cache-system usage

pub use crate::field_map::FieldMap;
pub use crate::field_map_cache::FieldMapCache;
