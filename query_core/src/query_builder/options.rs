//! List query options
//!
//! Declarative description of one list request. Built with chaining methods
//! and handed to the query builder, which does not modify it.

use crate::executor::QueryContext;
use crate::query_builder::filter::QueryFilter;
use crate::query_builder::join::JoinCondition;
use crate::query_builder::pagination::{PageInfo, PaginationPolicy};
use config::QueryConfig;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Options {
    pub page_info: PageInfo,
    /// Columns searched with the page info's key
    pub likes: Vec<String>,
    /// Relation fields to load with each row
    pub preloads: Vec<String>,
    pub joins: Vec<JoinCondition>,
    pub where_filter: Option<QueryFilter>,
    /// Trusted order spec used when the request carries none
    pub default_order: String,
    /// Fields a request may sort by; empty accepts any field
    pub allowed_sorts: Vec<String>,
    pub select_fields: Vec<String>,
    pub omit_fields: Vec<String>,
    pub context: QueryContext,
    pub enable_field_cache: bool,
    pub policy: PaginationPolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            page_info: PageInfo::default(),
            likes: Vec::new(),
            preloads: Vec::new(),
            joins: Vec::new(),
            where_filter: None,
            default_order: String::new(),
            allowed_sorts: Vec::new(),
            select_fields: Vec::new(),
            omit_fields: Vec::new(),
            context: QueryContext::default(),
            enable_field_cache: true,
            policy: PaginationPolicy::default(),
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options carrying the configured pagination bounds, cache flag and timeout
    pub fn from_config(config: &QueryConfig) -> Self {
        let mut options = Self {
            policy: PaginationPolicy::from(config),
            enable_field_cache: config.enable_field_cache,
            ..Self::default()
        };
        if let Some(ms) = config.statement_timeout_ms {
            options.context.timeout = Some(Duration::from_millis(ms));
        }
        options
    }

    pub fn page_info(mut self, page_info: PageInfo) -> Self {
        self.page_info = page_info;
        self
    }

    pub fn likes(mut self, columns: &[&str]) -> Self {
        self.likes = owned(columns);
        self
    }

    pub fn preloads(mut self, relations: &[&str]) -> Self {
        self.preloads = owned(relations);
        self
    }

    pub fn join(mut self, join: JoinCondition) -> Self {
        self.joins.push(join);
        self
    }

    pub fn joins(mut self, joins: Vec<JoinCondition>) -> Self {
        self.joins = joins;
        self
    }

    pub fn where_filter(mut self, filter: QueryFilter) -> Self {
        self.where_filter = Some(filter);
        self
    }

    pub fn default_order(mut self, order: impl Into<String>) -> Self {
        self.default_order = order.into();
        self
    }

    pub fn allowed_sorts(mut self, fields: &[&str]) -> Self {
        self.allowed_sorts = owned(fields);
        self
    }

    pub fn select_fields(mut self, fields: &[&str]) -> Self {
        self.select_fields = owned(fields);
        self
    }

    pub fn omit_fields(mut self, fields: &[&str]) -> Self {
        self.omit_fields = owned(fields);
        self
    }

    pub fn context(mut self, context: QueryContext) -> Self {
        self.context = context;
        self
    }

    pub fn enable_field_cache(mut self, enabled: bool) -> Self {
        self.enable_field_cache = enabled;
        self
    }

    pub fn policy(mut self, policy: PaginationPolicy) -> Self {
        self.policy = policy;
        self
    }
}
