//! List query builder
//!
//! A [`QueryBuilder`] turns a model instance and [`Options`] into one count and
//! one select statement. `build()` runs the clause stages in a fixed order and
//! stops at the first failure, recording it instead of returning it; the
//! result accessors then report the recorded error without touching the store.

use crate::errors::QueryError;
use crate::executor::QueryExecutor;
use crate::mapper::{check_shapes, map_records, ExcludeSet, TargetSequence};
use crate::query_builder::filter::QueryFilter;
use crate::query_builder::options::Options;
use crate::query_builder::ordering::parse_sort;
use crate::query_builder::statement::Statement;
use crate::record::{Mappable, Record};
use crate::validation::ValidatedJoinTable;
use cache_system::FieldMapCache;
use std::sync::Arc;
use type_mapping::FieldValue;

#[derive(Debug)]
enum BuildState {
    Fresh,
    Built,
    Failed(QueryError),
}

/// Single-use list query over records of type `T`
pub struct QueryBuilder<T: Record> {
    executor: Arc<dyn QueryExecutor>,
    model: T,
    options: Options,
    statement: Statement,
    state: BuildState,
    total: i64,
    field_cache: Arc<FieldMapCache>,
}

impl<T: Record> QueryBuilder<T> {
    /// Fields of `model` that differ from `T::default()` become equality filters
    pub fn new(executor: Arc<dyn QueryExecutor>, model: T, options: Options) -> Self {
        Self {
            executor,
            model,
            options,
            statement: Statement::new(T::record_shape()),
            state: BuildState::Fresh,
            total: 0,
            field_cache: FieldMapCache::global(),
        }
    }

    /// Use a specific cache instead of the process-wide one
    pub fn with_field_cache(mut self, cache: Arc<FieldMapCache>) -> Self {
        self.field_cache = cache;
        self
    }

    /// Run every stage up to and including the count. Errors are recorded and
    /// surface from `get_result`/`map_to_target`.
    pub async fn build(mut self) -> Self {
        if !matches!(self.state, BuildState::Fresh) {
            return self;
        }

        self.state = match self.run_stages().await {
            Ok(()) => BuildState::Built,
            Err(e) => {
                tracing::warn!(
                    table = T::record_shape().table,
                    label = self.options.context.label.as_deref().unwrap_or("-"),
                    error = %e,
                    "list query build failed"
                );
                BuildState::Failed(e)
            }
        };
        self
    }

    async fn run_stages(&mut self) -> Result<(), QueryError> {
        self.apply_model_filters();
        self.apply_field_filters();
        self.apply_joins()?;
        self.apply_fuzzy_search();
        self.apply_where_filter();
        self.apply_preloads();
        self.apply_count().await?;
        self.apply_pagination();
        self.apply_sorting()?;

        crate::debug_log!(
            table = self.statement.table(),
            total = self.total,
            filters = self.statement.filters.len(),
            "list query built"
        );
        Ok(())
    }

    fn apply_model_filters(&mut self) {
        let shape = T::record_shape();
        let blank = T::default();

        for (index, field) in shape.fields.iter().enumerate() {
            if field.relation.is_some() || self.model.nested(index).is_some() {
                continue;
            }
            let (Some(value), Some(default)) =
                (self.model.field_value(index), blank.field_value(index))
            else {
                continue;
            };
            if value == default || matches!(value, FieldValue::Json(_) | FieldValue::Record { .. }) {
                continue;
            }
            let column = self.statement.qualify(field.name);
            self.statement.filters.push(QueryFilter::eq(&column, value));
        }
    }

    fn apply_field_filters(&mut self) {
        if !self.options.select_fields.is_empty() {
            self.statement.columns = self.options.select_fields.clone();
        } else if !self.options.omit_fields.is_empty() {
            let omit = &self.options.omit_fields;
            self.statement.columns.retain(|column| !omit.contains(column));
        }
    }

    fn apply_joins(&mut self) -> Result<(), QueryError> {
        for join in &self.options.joins {
            ValidatedJoinTable::new(&join.table)
                .map_err(|_| QueryError::JoinConditionInvalid(join.table.clone()))?;
            self.statement.joins.push(join.clone());
        }
        Ok(())
    }

    fn apply_fuzzy_search(&mut self) {
        let key = &self.options.page_info.key;
        if key.is_empty() || self.options.likes.is_empty() {
            return;
        }
        self.statement
            .filters
            .push(QueryFilter::fuzzy(&self.options.likes, key));
    }

    fn apply_where_filter(&mut self) {
        if let Some(filter) = &self.options.where_filter {
            self.statement.filters.push(filter.clone());
        }
    }

    fn apply_preloads(&mut self) {
        self.statement.preloads = self.options.preloads.clone();
    }

    async fn apply_count(&mut self) -> Result<(), QueryError> {
        self.total = self
            .executor
            .count(&self.statement, &self.options.context)
            .await
            .map_err(QueryError::CountFailed)?;
        Ok(())
    }

    fn apply_pagination(&mut self) {
        let policy = &self.options.policy;
        let page_info = &self.options.page_info;
        self.statement.limit = Some(policy.safe_limit(page_info.limit));
        self.statement.offset = Some(policy.offset(page_info.page, page_info.limit));
    }

    fn apply_sorting(&mut self) -> Result<(), QueryError> {
        let requested = &self.options.page_info.order;
        self.statement.order_by = if requested.trim().is_empty() {
            // default order is trusted
            parse_sort(&self.options.default_order, &[])?
        } else if self.options.allowed_sorts.is_empty() {
            // without an allow-list, user input may only name the record's own columns
            let columns: Vec<String> = T::record_shape().columns().map(str::to_string).collect();
            let fields = parse_sort(requested, &columns)?;
            match fields.first() {
                Some(field) if columns.is_empty() => {
                    return Err(QueryError::SortFieldNotAllowed(field.field.clone()));
                }
                _ => fields,
            }
        } else {
            parse_sort(requested, &self.options.allowed_sorts)?
        };
        Ok(())
    }

    /// Fail with the recorded error, if any
    fn ensure_built(&mut self) -> Result<(), QueryError> {
        match std::mem::replace(&mut self.state, BuildState::Built) {
            BuildState::Built => Ok(()),
            BuildState::Fresh => {
                self.state = BuildState::Fresh;
                Err(QueryError::BuilderNotInitialized)
            }
            BuildState::Failed(e) => Err(e),
        }
    }

    async fn fetch_records(&self) -> Result<Vec<T>, QueryError> {
        let rows = self
            .executor
            .fetch(&self.statement, &self.options.context)
            .await
            .map_err(QueryError::QueryExecutionFailed)?;
        Ok(rows.into_iter().map(|row| row.into_record::<T>()).collect())
    }

    /// Page of records and the total number of matching rows
    pub async fn get_result(mut self) -> Result<(Vec<T>, i64), QueryError> {
        self.ensure_built()?;
        let records = self.fetch_records().await?;
        Ok((records, self.total))
    }

    /// Fetch the page and map it onto `target`, replacing its contents.
    /// Returns the total number of matching rows.
    pub async fn map_to_target<S: TargetSequence>(
        mut self,
        target: &mut S,
        exclude: &[&str],
    ) -> Result<i64, QueryError> {
        self.ensure_built()?;
        let sequence = target
            .sequence_mut()
            .ok_or(QueryError::TargetNotSequenceRef)?;
        check_shapes::<T, S::Element>()?;

        let records = self.fetch_records().await?;
        let cache = self
            .options
            .enable_field_cache
            .then(|| self.field_cache.as_ref());
        *sequence = map_records::<T, S::Element>(&records, &ExcludeSet::new(exclude), cache)?;
        Ok(self.total)
    }

    /// Fetch the page mapped onto a new vector of `E`
    pub async fn map_to<E: Mappable>(self, exclude: &[&str]) -> Result<(Vec<E>, i64), QueryError> {
        let mut mapped: Vec<E> = Vec::new();
        let total = self.map_to_target(&mut mapped, exclude).await?;
        Ok((mapped, total))
    }

    /// Statement compiled so far
    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    /// Count captured by `build()`
    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn is_built(&self) -> bool {
        matches!(self.state, BuildState::Built)
    }

    /// Error recorded by `build()`, if it failed
    pub fn error(&self) -> Option<&QueryError> {
        match &self.state {
            BuildState::Failed(e) => Some(e),
            _ => None,
        }
    }
}
