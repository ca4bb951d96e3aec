//! Core ListQuery functionality
//!
//! [`ListQuery`] owns the connection pool and the query settings, and hands
//! out list query builders bound to a PostgreSQL executor.

use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ListQueryError;
use config::{AppConfig, DatabaseConfig, QueryConfig};
use query_core::prelude::{FieldMapCache, Options, PgExecutor, QueryBuilder, QueryExecutor};
use query_core::Record;

/// Entry point that manages the database connection and query settings
pub struct ListQuery {
    pool: PgPool,
    query_config: QueryConfig,
    field_cache: Arc<FieldMapCache>,
}

impl ListQuery {
    /// Connect with default query settings
    pub async fn new(config: DatabaseConfig) -> Result<Self, ListQueryError> {
        Self::with_query_config(config, QueryConfig::default()).await
    }

    /// Connect using both sections of an application config
    pub async fn from_config(config: AppConfig) -> Result<Self, ListQueryError> {
        Self::with_query_config(config.database, config.query).await
    }

    /// Load the application config (see [`AppConfig::load`]) and connect
    pub async fn from_env() -> Result<Self, ListQueryError> {
        Self::from_config(AppConfig::load()?).await
    }

    pub async fn with_query_config(
        config: DatabaseConfig,
        query_config: QueryConfig,
    ) -> Result<Self, ListQueryError> {
        query_config.validate()?;
        let connection_string = config.connection_string();

        let mut pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        // Set max lifetime if specified
        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        let pool = pool_options.connect(&connection_string).await?;
        tracing::info!(
            host = %config.host,
            database = %config.database,
            max_connections = config.max_connections,
            "listquery connected"
        );

        Ok(Self::from_pool(pool, query_config))
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool, query_config: QueryConfig) -> Self {
        Self {
            pool,
            query_config,
            field_cache: FieldMapCache::global(),
        }
    }

    /// Use a dedicated field-map cache instead of the process-wide one
    pub fn with_field_cache(mut self, cache: Arc<FieldMapCache>) -> Self {
        self.field_cache = cache;
        self
    }

    /// Get database pool reference
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn query_config(&self) -> &QueryConfig {
        &self.query_config
    }

    pub fn field_cache(&self) -> &Arc<FieldMapCache> {
        &self.field_cache
    }

    /// PostgreSQL executor over the pool, honoring the configured statement timeout
    pub fn executor(&self) -> Arc<dyn QueryExecutor> {
        let mut executor = PgExecutor::new(self.pool.clone());
        if let Some(timeout_ms) = self.query_config.statement_timeout_ms {
            executor = executor.with_statement_timeout(Duration::from_millis(timeout_ms));
        }
        Arc::new(executor)
    }

    /// Options preset from the configured pagination bounds and cache switch
    pub fn options(&self) -> Options {
        Options::from_config(&self.query_config)
    }

    /// New list query over `T`; non-default fields of `model` become equality filters
    pub fn query<T: Record>(&self, model: T, options: Options) -> QueryBuilder<T> {
        QueryBuilder::new(self.executor(), model, options).with_field_cache(self.field_cache.clone())
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), ListQueryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
