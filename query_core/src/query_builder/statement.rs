//! Compiled statement
//!
//! The builder accumulates clauses into a [`Statement`]; executors render or
//! evaluate it. The statement is plain data so it can be inspected in tests.

use crate::query_builder::filter::QueryFilter;
use crate::query_builder::join::JoinCondition;
use crate::query_builder::ordering::SortField;
use crate::record::RecordShape;

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub shape: &'static RecordShape,
    /// Selected columns of the base table
    pub columns: Vec<String>,
    pub joins: Vec<JoinCondition>,
    /// Predicates combined with AND
    pub filters: Vec<QueryFilter>,
    /// Relation fields to load with each row
    pub preloads: Vec<String>,
    pub order_by: Vec<SortField>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Statement {
    /// Unfiltered statement over every column of the record's table
    pub fn new(shape: &'static RecordShape) -> Self {
        Self {
            shape,
            columns: shape.columns().map(str::to_string).collect(),
            joins: Vec::new(),
            filters: Vec::new(),
            preloads: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn table(&self) -> &'static str {
        self.shape.table
    }

    /// Qualify a bare column name with the base table
    pub fn qualify(&self, column: &str) -> String {
        if column.contains('.') {
            column.to_string()
        } else {
            format!("{}.{}", self.shape.table, column)
        }
    }
}

/// Column name without any table qualifier
pub fn unqualified(column: &str) -> &str {
    column.rsplit('.').next().unwrap_or(column)
}
