//! SQL generation
//!
//! Renders a [`Statement`] as PostgreSQL text with `$n` placeholders. Values
//! are never interpolated; the only text taken from callers is the join
//! table (validated by the builder), join and raw predicates, and column names.

use crate::errors::StoreError;
use crate::query_builder::filter::{LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
use crate::query_builder::join::JoinCondition;
use crate::query_builder::ordering::SortField;
use crate::query_builder::statement::Statement;
use type_mapping::FieldValue;

pub struct SqlGenerator;

impl SqlGenerator {
    /// `SELECT COUNT(*)` over joins and filters; ordering, paging and preloads are ignored
    pub fn render_count(statement: &Statement) -> (String, Vec<FieldValue>) {
        let mut values = Vec::new();
        let mut param_counter = 1;

        let mut sql = format!("SELECT COUNT(*) AS total FROM {}", statement.table());
        Self::push_clause(
            &mut sql,
            Self::build_join_clause(&statement.joins, &mut values, &mut param_counter),
        );
        Self::push_clause(
            &mut sql,
            Self::build_where_clause(&statement.filters, &mut values, &mut param_counter),
        );

        (sql, values)
    }

    /// Full select including preload sub-selects, ordering and paging
    pub fn render_select(statement: &Statement) -> Result<(String, Vec<FieldValue>), StoreError> {
        let mut values = Vec::new();
        let mut param_counter = 1;

        let mut select_items: Vec<String> = statement
            .columns
            .iter()
            .map(|column| statement.qualify(column))
            .collect();
        if select_items.is_empty() {
            select_items.push(format!("{}.*", statement.table()));
        }
        for name in &statement.preloads {
            select_items.push(Self::build_preload_item(statement, name)?);
        }

        let mut sql = format!(
            "SELECT {} FROM {}",
            select_items.join(", "),
            statement.table()
        );
        Self::push_clause(
            &mut sql,
            Self::build_join_clause(&statement.joins, &mut values, &mut param_counter),
        );
        Self::push_clause(
            &mut sql,
            Self::build_where_clause(&statement.filters, &mut values, &mut param_counter),
        );
        Self::push_clause(&mut sql, Self::build_order_clause(&statement.order_by));
        Self::push_clause(
            &mut sql,
            Self::build_limit_clause(statement.limit, statement.offset),
        );

        Ok((sql, values))
    }

    fn push_clause(sql: &mut String, clause: String) {
        if !clause.is_empty() {
            sql.push(' ');
            sql.push_str(&clause);
        }
    }

    /// Build JOIN clauses, numbering `?` placeholders in `on`
    pub fn build_join_clause(
        joins: &[JoinCondition],
        values: &mut Vec<FieldValue>,
        param_counter: &mut i32,
    ) -> String {
        joins
            .iter()
            .map(|join| {
                let on = Self::number_placeholders(&join.on, &join.args, values, param_counter);
                if on.trim().is_empty() {
                    format!("{} {}", join.join_type.to_sql(), join.table)
                } else {
                    format!("{} {} ON {}", join.join_type.to_sql(), join.table, on)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Build WHERE clause from conditions
    pub fn build_where_clause(
        conditions: &[QueryFilter],
        values: &mut Vec<FieldValue>,
        param_counter: &mut i32,
    ) -> String {
        if conditions.is_empty() {
            return "".to_string();
        }

        let conditions_sql = conditions
            .iter()
            .map(|condition| Self::build_condition_sql(condition, values, param_counter))
            .collect::<Vec<_>>()
            .join(" AND ");

        format!("WHERE {}", conditions_sql)
    }

    fn build_condition_sql(
        filter: &QueryFilter,
        values: &mut Vec<FieldValue>,
        param_counter: &mut i32,
    ) -> String {
        match filter {
            QueryFilter::Condition(condition) => {
                Self::build_single_condition_sql(condition, values, param_counter)
            }
            QueryFilter::Group { operator, filters } => {
                if filters.is_empty() {
                    return match operator {
                        LogicalOperator::And => "1=1".to_string(),
                        LogicalOperator::Or => "1=0".to_string(),
                    };
                }

                let operator_str = match operator {
                    LogicalOperator::And => " AND ",
                    LogicalOperator::Or => " OR ",
                };

                let group_conditions = filters
                    .iter()
                    .map(|f| Self::build_condition_sql(f, values, param_counter))
                    .collect::<Vec<_>>()
                    .join(operator_str);

                format!("({})", group_conditions)
            }
            QueryFilter::Raw { sql, args } => {
                format!(
                    "({})",
                    Self::number_placeholders(sql, args, values, param_counter)
                )
            }
        }
    }

    fn next_param(value: &FieldValue, values: &mut Vec<FieldValue>, param_counter: &mut i32) -> String {
        values.push(value.clone());
        let param = format!("${}", param_counter);
        *param_counter += 1;
        param
    }

    fn build_single_condition_sql(
        condition: &QueryCondition,
        values: &mut Vec<FieldValue>,
        param_counter: &mut i32,
    ) -> String {
        let field = &condition.field;
        let first = condition.values.first().filter(|v| !v.is_null());

        let compare = |symbol: &str, values: &mut Vec<FieldValue>, param_counter: &mut i32| {
            match first {
                Some(value) => {
                    let param = Self::next_param(value, values, param_counter);
                    format!("{} {} {}", field, symbol, param)
                }
                // Invalid condition
                None => "1=0".to_string(),
            }
        };

        match condition.operator {
            QueryOperator::Eq => match first {
                Some(_) => compare("=", values, param_counter),
                None => format!("{} IS NULL", field),
            },
            QueryOperator::Ne => match first {
                Some(_) => compare("!=", values, param_counter),
                None => format!("{} IS NOT NULL", field),
            },
            QueryOperator::Gt => compare(">", values, param_counter),
            QueryOperator::Gte => compare(">=", values, param_counter),
            QueryOperator::Lt => compare("<", values, param_counter),
            QueryOperator::Lte => compare("<=", values, param_counter),
            QueryOperator::Like => compare("LIKE", values, param_counter),
            QueryOperator::ILike => compare("ILIKE", values, param_counter),
            QueryOperator::In | QueryOperator::NotIn => {
                let negated = condition.operator == QueryOperator::NotIn;
                if condition.values.is_empty() {
                    // Empty IN matches nothing, empty NOT IN matches everything
                    return if negated { "1=1" } else { "1=0" }.to_string();
                }

                let placeholders: Vec<String> = condition
                    .values
                    .iter()
                    .map(|value| Self::next_param(value, values, param_counter))
                    .collect();

                let keyword = if negated { "NOT IN" } else { "IN" };
                format!("{} {} ({})", field, keyword, placeholders.join(", "))
            }
            QueryOperator::IsNull => format!("{} IS NULL", field),
            QueryOperator::IsNotNull => format!("{} IS NOT NULL", field),
        }
    }

    /// Replace each `?` with the next `$n`, binding `args` in order. A `?`
    /// without a matching argument is left as is.
    fn number_placeholders(
        sql: &str,
        args: &[FieldValue],
        values: &mut Vec<FieldValue>,
        param_counter: &mut i32,
    ) -> String {
        let mut rendered = String::with_capacity(sql.len() + args.len() * 2);
        let mut args = args.iter();

        for c in sql.chars() {
            if c == '?' {
                if let Some(arg) = args.next() {
                    rendered.push_str(&Self::next_param(arg, values, param_counter));
                    continue;
                }
            }
            rendered.push(c);
        }

        rendered
    }

    /// Correlated `json_agg` sub-select for a relation field
    fn build_preload_item(statement: &Statement, name: &str) -> Result<String, StoreError> {
        let (_, relation) = statement
            .shape
            .relation(name)
            .ok_or_else(|| StoreError::UnknownRelation(name.to_string()))?;

        Ok(format!(
            "COALESCE((SELECT json_agg(rel) FROM {} rel WHERE rel.{} = {}.{}), '[]'::json) AS {}",
            relation.table,
            relation.foreign_key,
            statement.table(),
            relation.references,
            name
        ))
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(order_by: &[SortField]) -> String {
        if order_by.is_empty() {
            return "".to_string();
        }

        let order_items: Vec<String> = order_by
            .iter()
            .map(|sort| format!("{} {}", sort.field, sort.direction.to_sql()))
            .collect();

        format!("ORDER BY {}", order_items.join(", "))
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(limit: Option<i64>, offset: Option<i64>) -> String {
        let mut clauses = Vec::new();

        if let Some(limit) = limit {
            clauses.push(format!("LIMIT {}", limit));
        }

        if let Some(offset) = offset {
            clauses.push(format!("OFFSET {}", offset));
        }

        clauses.join(" ")
    }
}
