//! Query executors
//!
//! The builder talks to the backing store only through [`QueryExecutor`]: one
//! count and one fetch per list query. [`PgExecutor`] runs statements on
//! PostgreSQL; [`MemoryExecutor`] evaluates them over in-process tables.

mod memory;
mod postgres;

pub use memory::{ExecutedStatement, MemoryExecutor, StatementKind};
pub use postgres::PgExecutor;

use crate::errors::StoreError;
use crate::query_builder::statement::Statement;
use crate::record::Record;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use type_mapping::FieldValue;

/// Per-request execution settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryContext {
    /// Upper bound for each store round trip
    pub timeout: Option<Duration>,
    /// Free-form label carried into executor logs
    pub label: Option<String>,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub(crate) fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("-")
    }
}

/// A fetched row: column names with their decoded values, in select order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, FieldValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row holding every column of a record; relation fields are left out
    pub fn from_record<R: Record>(record: &R) -> Self {
        let shape = R::record_shape();
        let columns = shape
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| field.relation.is_none())
            .filter_map(|(index, field)| {
                record
                    .field_value(index)
                    .map(|value| (field.name.to_string(), value))
            })
            .collect();
        Self { columns }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.push(column, value);
        self
    }

    /// Set a column, replacing an existing value of the same name
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<FieldValue>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.columns.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> &[(String, FieldValue)] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Object form used for aggregated relation rows
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.columns
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }

    /// Materialize a record. Columns without a matching field, or whose value
    /// does not fit the field type, are ignored.
    pub fn into_record<T: Record>(self) -> T {
        let shape = T::record_shape();
        let mut record = T::default();
        for (column, value) in self.columns {
            if let Some(index) = shape.index_of(&column) {
                record.set_field(index, value);
            }
        }
        record
    }
}

/// Executes compiled list statements against a backing store
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Number of rows matching the statement's joins and filters
    async fn count(&self, statement: &Statement, ctx: &QueryContext) -> Result<i64, StoreError>;

    /// Rows for the statement, paged and ordered, with preloads attached
    async fn fetch(&self, statement: &Statement, ctx: &QueryContext) -> Result<Vec<Row>, StoreError>;
}

/// Run one store round trip under the context timeout, if any
pub(crate) async fn with_timeout<T, F>(timeout: Option<Duration>, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| StoreError::Timeout(limit.as_millis() as u64))?,
        None => fut.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_replaces_existing_column() {
        let mut row = Row::new().with("id", 1).with("name", "a");
        row.push("name", "b");
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("name"), Some(&FieldValue::Text("b".into())));
    }

    #[test]
    fn test_row_to_json() {
        let row = Row::new().with("id", 7).with("note", FieldValue::Null);
        assert_eq!(row.to_json(), serde_json::json!({"id": 7, "note": null}));
    }

    #[tokio::test]
    async fn test_timeout_is_reported_in_millis() {
        let result: Result<(), StoreError> = with_timeout(Some(Duration::from_millis(5)), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(StoreError::Timeout(5))));
    }
}
