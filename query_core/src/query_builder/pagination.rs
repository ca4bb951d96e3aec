//! Pagination
//!
//! Raw page/limit values come from untrusted request input. Only the safe
//! accessors are used when building a statement.

use config::QueryConfig;
use serde::{Deserialize, Serialize};

/// Bounds applied to untrusted pagination input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationPolicy {
    pub max_page: i64,
    pub max_limit: i64,
    pub default_limit: i64,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            max_page: 20,
            max_limit: 50,
            default_limit: 10,
        }
    }
}

impl From<&QueryConfig> for PaginationPolicy {
    fn from(config: &QueryConfig) -> Self {
        Self {
            max_page: config.max_page,
            max_limit: config.max_limit,
            default_limit: config.default_limit,
        }
    }
}

impl PaginationPolicy {
    /// Page outside `1..=max_page` falls back to the first page
    pub fn safe_page(&self, page: i64) -> i64 {
        if page <= 0 || page > self.max_page {
            1
        } else {
            page
        }
    }

    /// Limit outside `1..=max_limit` falls back to the default limit
    pub fn safe_limit(&self, limit: i64) -> i64 {
        if limit <= 0 || limit > self.max_limit {
            self.default_limit
        } else {
            limit
        }
    }

    pub fn offset(&self, page: i64, limit: i64) -> i64 {
        (self.safe_page(page) - 1) * self.safe_limit(limit)
    }
}

/// Pagination, search key and order request, as received from a client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageInfo {
    pub limit: i64,
    pub page: i64,
    /// Fuzzy-search key
    pub key: String,
    /// Order spec, `field[:asc|desc]` segments separated by commas
    pub order: String,
}

impl PageInfo {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = order.into();
        self
    }

    pub fn safe_page(&self) -> i64 {
        PaginationPolicy::default().safe_page(self.page)
    }

    pub fn safe_limit(&self) -> i64 {
        PaginationPolicy::default().safe_limit(self.limit)
    }

    pub fn offset(&self) -> i64 {
        PaginationPolicy::default().offset(self.page, self.limit)
    }
}
