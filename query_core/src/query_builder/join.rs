use type_mapping::FieldValue;

/// Represents the type of SQL JOIN operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinType {
    /// INNER JOIN - returns records that have matching values in both tables
    #[default]
    Inner,
    /// LEFT JOIN - returns all records from the left table and matched records from the right table
    Left,
    /// RIGHT JOIN - returns all records from the right table and matched records from the left table
    Right,
    /// FULL OUTER JOIN - returns all records when there is a match in either left or right table
    Full,
    /// CROSS JOIN - returns Cartesian product of both tables
    Cross,
}

impl JoinType {
    /// Convert JoinType to SQL string
    pub fn to_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL OUTER JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }
}

/// A join requested by the caller
///
/// `table` is checked against the join-table character set before use. `on`
/// may contain `?` placeholders which are bound positionally from `args`.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinCondition {
    pub join_type: JoinType,
    /// Table to join with, optionally followed by an alias
    pub table: String,
    pub on: String,
    pub args: Vec<FieldValue>,
}

impl JoinCondition {
    pub fn new(join_type: JoinType, table: impl Into<String>, on: impl Into<String>) -> Self {
        Self {
            join_type,
            table: table.into(),
            on: on.into(),
            args: Vec::new(),
        }
    }

    pub fn inner(table: impl Into<String>, on: impl Into<String>) -> Self {
        Self::new(JoinType::Inner, table, on)
    }

    pub fn left(table: impl Into<String>, on: impl Into<String>) -> Self {
        Self::new(JoinType::Left, table, on)
    }

    /// Add a positional argument for the next `?` in `on`
    pub fn arg(mut self, value: impl Into<FieldValue>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn with_args(mut self, args: Vec<FieldValue>) -> Self {
        self.args = args;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_type_to_sql() {
        assert_eq!(JoinType::Inner.to_sql(), "INNER JOIN");
        assert_eq!(JoinType::Left.to_sql(), "LEFT JOIN");
        assert_eq!(JoinType::Right.to_sql(), "RIGHT JOIN");
        assert_eq!(JoinType::Full.to_sql(), "FULL OUTER JOIN");
        assert_eq!(JoinType::Cross.to_sql(), "CROSS JOIN");
    }

    #[test]
    fn test_join_condition_with_args() {
        let join = JoinCondition::left("orders o", "o.user_id = users.id AND o.status = ?")
            .arg("paid");

        assert_eq!(join.join_type, JoinType::Left);
        assert_eq!(join.table, "orders o");
        assert_eq!(join.args, vec![FieldValue::Text("paid".into())]);
    }

    #[test]
    fn test_default_join_type_is_inner() {
        assert_eq!(JoinType::default(), JoinType::Inner);
    }
}
