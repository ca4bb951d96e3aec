//! Field-map cache implementation
//!
//! This module provides the process-wide [`FieldMapCache`]. Entries are keyed
//! by the source and target type pair (plus the exclusion set) and are never
//! evicted: the number of distinct keys is bounded by the record types the
//! program declares, so the cache grows only up to that static surface.

use crate::field_map::FieldMap;
use dashmap::DashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

static GLOBAL: LazyLock<Arc<FieldMapCache>> = LazyLock::new(|| Arc::new(FieldMapCache::new()));

/// Concurrent cache of field correspondence tables
#[derive(Default)]
pub struct FieldMapCache {
    entries: DashMap<String, Arc<FieldMap>>,
    builds: AtomicU64,
}

impl Debug for FieldMapCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldMapCache")
            .field("entries", &self.entries.len())
            .field("builds", &self.builds())
            .finish()
    }
}

impl FieldMapCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance shared by every query builder
    pub fn global() -> Arc<FieldMapCache> {
        Arc::clone(&GLOBAL)
    }

    /// Build the cache key for a type pair and its exclusion set
    pub fn key(source_type: &str, target_type: &str, excluded: &[String]) -> String {
        let mut key = String::with_capacity(source_type.len() + target_type.len() + 3);
        key.push_str(source_type);
        key.push_str("->");
        key.push_str(target_type);
        key.push('|');
        key.push_str(&excluded.join(","));
        key
    }

    /// Return the cached table for `key`, building and storing it on a miss.
    ///
    /// `builder` runs without any shard lock held. Concurrent misses on the same
    /// key may each build; builders are pure, so whichever store lands last is
    /// equivalent to the others.
    pub fn get_or_build<F>(&self, key: &str, builder: F) -> Arc<FieldMap>
    where
        F: FnOnce() -> FieldMap,
    {
        if let Some(existing) = self.get(key) {
            return existing;
        }

        let built = Arc::new(builder());
        self.builds.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(key.to_string(), Arc::clone(&built));

        tracing::trace!(key, fields = built.len(), "field map cached");
        built
    }

    pub fn get(&self, key: &str) -> Option<Arc<FieldMap>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Number of times a builder has run on a miss
    pub fn builds(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
