//! PostgreSQL executor
//!
//! Renders statements with [`SqlGenerator`], binds [`FieldValue`] parameters
//! and decodes result columns by their reported PostgreSQL type.

use super::{with_timeout, QueryContext, QueryExecutor, Row};
use crate::errors::StoreError;
use crate::query_builder::sql_generation::SqlGenerator;
use crate::query_builder::statement::Statement;
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPool, PgRow};
use sqlx::{Column, Postgres, Row as _, TypeInfo};
use std::time::Duration;
use type_mapping::{pg_type_to_value_kind, FieldValue, ValueKind};

// Macro for the shared parameter binding logic
macro_rules! bind_field_value {
    ($query:expr, $param:expr) => {
        match $param {
            FieldValue::Null => $query.bind(Option::<String>::None),
            FieldValue::Boolean(b) => $query.bind(b),
            FieldValue::Integer(i) => $query.bind(i),
            FieldValue::Unsigned(u) => match i64::try_from(u) {
                Ok(i) => $query.bind(i),
                Err(_) => $query.bind(u.to_string()),
            },
            FieldValue::Real(f) => $query.bind(f),
            FieldValue::Float(f) => $query.bind(f),
            FieldValue::Text(s) => $query.bind(s),
            FieldValue::Uuid(u) => $query.bind(u),
            FieldValue::Timestamp(ts) => $query.bind(ts),
            FieldValue::Json(v) => $query.bind(sqlx::types::Json(v)),
            record @ FieldValue::Record { .. } => $query.bind(sqlx::types::Json(record.to_json())),
        }
    };
}

fn bind_param_raw<'q>(
    query: sqlx::query::Query<'q, Postgres, PgArguments>,
    param: FieldValue,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    bind_field_value!(query, param)
}

/// Executor backed by a sqlx PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgExecutor {
    pool: PgPool,
    statement_timeout: Option<Duration>,
}

impl PgExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            statement_timeout: None,
        }
    }

    /// Timeout used when the query context does not carry one
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn timeout_for(&self, ctx: &QueryContext) -> Option<Duration> {
        ctx.timeout.or(self.statement_timeout)
    }

    fn decode_row(row: &PgRow) -> Result<Row, StoreError> {
        let mut decoded = Row::new();
        for (index, column) in row.columns().iter().enumerate() {
            let type_name = column.type_info().name();
            let kind = pg_type_to_value_kind(type_name).ok_or_else(|| StoreError::Decode {
                column: column.name().to_string(),
                type_name: type_name.to_string(),
            })?;
            decoded.push(column.name(), Self::decode_column(row, index, kind)?);
        }
        Ok(decoded)
    }

    fn decode_column(row: &PgRow, index: usize, kind: ValueKind) -> Result<FieldValue, StoreError> {
        let value: FieldValue = match kind {
            ValueKind::Boolean => row.try_get::<Option<bool>, _>(index)?.into(),
            ValueKind::SmallInt => row.try_get::<Option<i16>, _>(index)?.into(),
            ValueKind::Integer => row.try_get::<Option<i32>, _>(index)?.into(),
            ValueKind::BigInt => row.try_get::<Option<i64>, _>(index)?.into(),
            ValueKind::Real => row.try_get::<Option<f32>, _>(index)?.into(),
            ValueKind::Float => row.try_get::<Option<f64>, _>(index)?.into(),
            ValueKind::Text => row.try_get::<Option<String>, _>(index)?.into(),
            ValueKind::Uuid => row.try_get::<Option<uuid::Uuid>, _>(index)?.into(),
            ValueKind::Timestamp => row
                .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index)?
                .into(),
            ValueKind::NaiveTimestamp => row
                .try_get::<Option<chrono::NaiveDateTime>, _>(index)?
                .map(|naive| naive.and_utc())
                .into(),
            ValueKind::Json => row.try_get::<Option<serde_json::Value>, _>(index)?.into(),
        };
        Ok(value)
    }
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn count(&self, statement: &Statement, ctx: &QueryContext) -> Result<i64, StoreError> {
        let (sql, params) = SqlGenerator::render_count(statement);
        tracing::debug!(label = ctx.label(), sql = %sql, params = params.len(), "count");

        let mut query = sqlx::query(&sql);
        for param in params {
            query = bind_param_raw(query, param);
        }

        let row = with_timeout(self.timeout_for(ctx), async {
            query.fetch_one(&self.pool).await.map_err(StoreError::from)
        })
        .await?;

        let total: i64 = row.try_get("total")?;
        Ok(total)
    }

    async fn fetch(&self, statement: &Statement, ctx: &QueryContext) -> Result<Vec<Row>, StoreError> {
        let (sql, params) = SqlGenerator::render_select(statement)?;
        tracing::debug!(label = ctx.label(), sql = %sql, params = params.len(), "select");

        let mut query = sqlx::query(&sql);
        for param in params {
            query = bind_param_raw(query, param);
        }

        let rows = with_timeout(self.timeout_for(ctx), async {
            query.fetch_all(&self.pool).await.map_err(StoreError::from)
        })
        .await?;

        crate::trace_log!(rows = rows.len(), "select returned");
        rows.iter().map(Self::decode_row).collect()
    }
}
