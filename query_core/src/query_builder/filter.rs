//! Query filters
//!
//! Predicates are kept as data until an executor renders or evaluates them.

use type_mapping::FieldValue;

/// Query condition operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Eq,        // =
    Ne,        // !=
    Gt,        // >
    Gte,       // >=
    Lt,        // <
    Lte,       // <=
    Like,      // LIKE
    ILike,     // ILIKE (case insensitive)
    In,        // IN
    NotIn,     // NOT IN
    IsNull,    // IS NULL
    IsNotNull, // IS NOT NULL
}

/// Single condition in WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCondition {
    pub field: String,
    pub operator: QueryOperator,
    /// Empty for IS NULL/IS NOT NULL; one entry per element for IN/NOT IN
    pub values: Vec<FieldValue>,
}

/// Logical operators for combining conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Query filter that can be nested
#[derive(Debug, Clone, PartialEq)]
pub enum QueryFilter {
    Condition(QueryCondition),
    Group {
        operator: LogicalOperator,
        filters: Vec<QueryFilter>,
    },
    /// SQL fragment with `?` placeholders bound positionally from `args`
    Raw { sql: String, args: Vec<FieldValue> },
}

impl QueryFilter {
    /// Create a simple condition
    pub fn condition(field: &str, operator: QueryOperator, values: Vec<FieldValue>) -> Self {
        Self::Condition(QueryCondition {
            field: field.to_string(),
            operator,
            values,
        })
    }

    /// Create AND group
    pub fn and(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::And,
            filters,
        }
    }

    /// Create OR group
    pub fn or(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::Or,
            filters,
        }
    }

    /// Raw SQL predicate
    pub fn raw(sql: impl Into<String>, args: Vec<FieldValue>) -> Self {
        Self::Raw {
            sql: sql.into(),
            args,
        }
    }

    /// Equal condition
    pub fn eq(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::condition(field, QueryOperator::Eq, vec![value.into()])
    }

    /// Not equal condition
    pub fn ne(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::condition(field, QueryOperator::Ne, vec![value.into()])
    }

    /// Greater than condition
    pub fn gt(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::condition(field, QueryOperator::Gt, vec![value.into()])
    }

    /// Greater than or equal condition
    pub fn gte(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::condition(field, QueryOperator::Gte, vec![value.into()])
    }

    /// Less than condition
    pub fn lt(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::condition(field, QueryOperator::Lt, vec![value.into()])
    }

    /// Less than or equal condition
    pub fn lte(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::condition(field, QueryOperator::Lte, vec![value.into()])
    }

    /// LIKE condition
    pub fn like(field: &str, pattern: &str) -> Self {
        Self::condition(
            field,
            QueryOperator::Like,
            vec![FieldValue::Text(pattern.to_string())],
        )
    }

    /// ILIKE condition (case insensitive)
    pub fn ilike(field: &str, pattern: &str) -> Self {
        Self::condition(
            field,
            QueryOperator::ILike,
            vec![FieldValue::Text(pattern.to_string())],
        )
    }

    /// IN condition
    pub fn in_values(field: &str, values: Vec<FieldValue>) -> Self {
        Self::condition(field, QueryOperator::In, values)
    }

    /// NOT IN condition
    pub fn not_in_values(field: &str, values: Vec<FieldValue>) -> Self {
        Self::condition(field, QueryOperator::NotIn, values)
    }

    /// IS NULL condition
    pub fn is_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNull, Vec::new())
    }

    /// IS NOT NULL condition
    pub fn is_not_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNotNull, Vec::new())
    }

    /// Fuzzy search: `column LIKE %key%` for each column, ORed together
    pub fn fuzzy(columns: &[String], key: &str) -> Self {
        let pattern = format!("%{}%", key);
        Self::or(
            columns
                .iter()
                .map(|column| Self::like(column, &pattern))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzy_builds_or_group() {
        let filter = QueryFilter::fuzzy(&["name".into(), "email".into()], "ab");
        let QueryFilter::Group { operator, filters } = filter else {
            panic!("expected group");
        };
        assert_eq!(operator, LogicalOperator::Or);
        assert_eq!(filters, vec![QueryFilter::like("name", "%ab%"), QueryFilter::like("email", "%ab%")]);
    }

    #[test]
    fn test_condition_values() {
        assert!(matches!(
            QueryFilter::is_null("deleted_at"),
            QueryFilter::Condition(QueryCondition { ref values, .. }) if values.is_empty()
        ));
        assert!(matches!(
            QueryFilter::eq("age", 30),
            QueryFilter::Condition(QueryCondition { operator: QueryOperator::Eq, ref values, .. })
                if values == &vec![FieldValue::Integer(30)]
        ));
    }
}
