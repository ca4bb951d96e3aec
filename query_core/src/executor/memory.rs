//! In-memory executor
//!
//! Evaluates statements over in-process tables of rows. Joins and raw SQL
//! predicates cannot be evaluated without a database and are rejected. Every
//! statement received is recorded so callers can inspect what was issued.

use super::{with_timeout, QueryContext, QueryExecutor, Row};
use crate::errors::StoreError;
use crate::query_builder::filter::{LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
use crate::query_builder::ordering::SortOrder;
use crate::query_builder::statement::{unqualified, Statement};
use crate::record::Record;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use std::time::Duration;
use type_mapping::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Count,
    Select,
}

/// A statement as received by the executor
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedStatement {
    pub kind: StatementKind,
    pub statement: Statement,
    pub label: Option<String>,
}

#[derive(Debug, Default)]
pub struct MemoryExecutor {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    executed: Mutex<Vec<ExecutedStatement>>,
    latency: Option<Duration>,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay applied to every call, for exercising timeouts
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_table(self, table: impl Into<String>, rows: Vec<Row>) -> Self {
        self.insert_rows(table, rows);
        self
    }

    /// Seed the record type's table with the given records
    pub fn with_records<R: Record>(self, records: &[R]) -> Self {
        let rows = records.iter().map(Row::from_record).collect();
        self.insert_rows(R::record_shape().table, rows);
        self
    }

    /// Append rows to a table, creating it if needed
    pub fn insert_rows(&self, table: impl Into<String>, rows: Vec<Row>) {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        tables.entry(table.into()).or_default().extend(rows);
    }

    /// Statements received so far, in order
    pub fn executed(&self) -> Vec<ExecutedStatement> {
        self.executed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn executed_count(&self, kind: StatementKind) -> usize {
        self.executed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|s| s.kind == kind)
            .count()
    }

    fn record(&self, kind: StatementKind, statement: &Statement, ctx: &QueryContext) {
        tracing::debug!(
            label = ctx.label(),
            table = statement.table(),
            ?kind,
            filters = statement.filters.len(),
            "memory statement"
        );
        self.executed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ExecutedStatement {
                kind,
                statement: statement.clone(),
                label: ctx.label.clone(),
            });
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn check_supported(statement: &Statement) -> Result<(), StoreError> {
        if !statement.joins.is_empty() {
            return Err(StoreError::Unsupported("joins".to_string()));
        }
        if statement.filters.iter().any(contains_raw) {
            return Err(StoreError::Unsupported("raw SQL predicates".to_string()));
        }
        Ok(())
    }

    fn matching_rows(&self, statement: &Statement) -> Result<Vec<Row>, StoreError> {
        Self::check_supported(statement)?;

        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        let rows = tables
            .get(statement.table())
            .ok_or_else(|| StoreError::UnknownTable(statement.table().to_string()))?;

        let mut matched = Vec::new();
        for row in rows {
            if all_match(row, &statement.filters) {
                matched.push(row.clone());
            }
        }
        Ok(matched)
    }

    fn attach_preloads(&self, statement: &Statement, rows: &mut [Row]) -> Result<(), StoreError> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());

        for name in &statement.preloads {
            let (_, relation) = statement
                .shape
                .relation(name)
                .ok_or_else(|| StoreError::UnknownRelation(name.clone()))?;
            let related = tables
                .get(relation.table)
                .ok_or_else(|| StoreError::UnknownTable(relation.table.to_string()))?;

            for row in rows.iter_mut() {
                let key = row.get(relation.references).cloned().unwrap_or(FieldValue::Null);
                let children: Vec<serde_json::Value> = related
                    .iter()
                    .filter(|child| {
                        child
                            .get(relation.foreign_key)
                            .is_some_and(|fk| fk.loosely_equals(&key))
                    })
                    .map(Row::to_json)
                    .collect();
                row.push(name.clone(), FieldValue::Json(serde_json::Value::Array(children)));
            }
        }
        Ok(())
    }

    fn fetch_now(&self, statement: &Statement) -> Result<Vec<Row>, StoreError> {
        let mut rows = self.matching_rows(statement)?;

        rows.sort_by(|a, b| {
            for sort in &statement.order_by {
                let column = unqualified(&sort.field);
                let left = a.get(column).unwrap_or(&FieldValue::Null);
                let right = b.get(column).unwrap_or(&FieldValue::Null);
                let ordering = left.compare(right).unwrap_or(Ordering::Equal);
                let ordering = match sort.direction {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });

        let offset = statement.offset.unwrap_or(0).max(0) as usize;
        let limit = statement.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        let mut page: Vec<Row> = rows.into_iter().skip(offset).take(limit).collect();

        self.attach_preloads(statement, &mut page)?;

        let selected: Vec<&str> = statement.columns.iter().map(|c| unqualified(c)).collect();
        Ok(page
            .into_iter()
            .map(|row| {
                let mut projected = Row::new();
                for (column, value) in row.columns() {
                    let keep = selected.contains(&column.as_str())
                        || statement.preloads.iter().any(|p| p == column);
                    if keep {
                        projected.push(column.clone(), value.clone());
                    }
                }
                projected
            })
            .collect())
    }
}

#[async_trait]
impl QueryExecutor for MemoryExecutor {
    async fn count(&self, statement: &Statement, ctx: &QueryContext) -> Result<i64, StoreError> {
        self.record(StatementKind::Count, statement, ctx);
        with_timeout(ctx.timeout, async {
            self.pause().await;
            Ok(self.matching_rows(statement)?.len() as i64)
        })
        .await
    }

    async fn fetch(&self, statement: &Statement, ctx: &QueryContext) -> Result<Vec<Row>, StoreError> {
        self.record(StatementKind::Select, statement, ctx);
        with_timeout(ctx.timeout, async {
            self.pause().await;
            self.fetch_now(statement)
        })
        .await
    }
}

fn contains_raw(filter: &QueryFilter) -> bool {
    match filter {
        QueryFilter::Raw { .. } => true,
        QueryFilter::Group { filters, .. } => filters.iter().any(contains_raw),
        QueryFilter::Condition(_) => false,
    }
}

fn all_match(row: &Row, filters: &[QueryFilter]) -> bool {
    filters.iter().all(|filter| matches_filter(row, filter))
}

fn matches_filter(row: &Row, filter: &QueryFilter) -> bool {
    match filter {
        QueryFilter::Condition(condition) => matches_condition(row, condition),
        QueryFilter::Group { operator, filters } => match operator {
            LogicalOperator::And => filters.iter().all(|f| matches_filter(row, f)),
            LogicalOperator::Or => filters.iter().any(|f| matches_filter(row, f)),
        },
        // rejected before evaluation
        QueryFilter::Raw { .. } => false,
    }
}

fn matches_condition(row: &Row, condition: &QueryCondition) -> bool {
    let value = row
        .get(unqualified(&condition.field))
        .unwrap_or(&FieldValue::Null);
    let first = condition.values.first().unwrap_or(&FieldValue::Null);

    let ordered = |accept: fn(Ordering) -> bool| {
        !value.is_null() && !first.is_null() && value.compare(first).is_some_and(accept)
    };

    match condition.operator {
        QueryOperator::Eq if first.is_null() => value.is_null(),
        QueryOperator::Eq => value.loosely_equals(first),
        QueryOperator::Ne if first.is_null() => !value.is_null(),
        QueryOperator::Ne => !value.is_null() && !value.loosely_equals(first),
        QueryOperator::Gt => ordered(|o| o == Ordering::Greater),
        QueryOperator::Gte => ordered(|o| o != Ordering::Less),
        QueryOperator::Lt => ordered(|o| o == Ordering::Less),
        QueryOperator::Lte => ordered(|o| o != Ordering::Greater),
        QueryOperator::Like => match (value.as_text(), first.as_text()) {
            (Some(text), Some(pattern)) => like_match(text, pattern),
            _ => false,
        },
        QueryOperator::ILike => match (value.as_text(), first.as_text()) {
            (Some(text), Some(pattern)) => {
                like_match(&text.to_lowercase(), &pattern.to_lowercase())
            }
            _ => false,
        },
        QueryOperator::In => {
            !value.is_null() && condition.values.iter().any(|v| value.loosely_equals(v))
        }
        QueryOperator::NotIn => {
            condition.values.is_empty()
                || (!value.is_null() && !condition.values.iter().any(|v| value.loosely_equals(v)))
        }
        QueryOperator::IsNull => value.is_null(),
        QueryOperator::IsNotNull => !value.is_null(),
    }
}

/// SQL LIKE with `%` (any run) and `_` (one character) wildcards
fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}
