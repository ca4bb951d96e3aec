//! Ordering
//!
//! Parsing of `field[:direction]` order specs and allow-list enforcement.

use crate::errors::QueryError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    /// `desc` in any case is descending, everything else ascending
    pub fn parse(direction: &str) -> Self {
        if direction.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub direction: SortOrder,
}

impl SortField {
    pub fn new(field: impl Into<String>, direction: SortOrder) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }
}

/// Parse an order spec such as `"name:desc, age"`.
///
/// Segments are split on commas and then on the first colon. Segments with an
/// empty field name are skipped. When `allowed` is non-empty every field must
/// appear in it verbatim; the first violation fails the whole parse.
pub fn parse_sort(spec: &str, allowed: &[String]) -> Result<Vec<SortField>, QueryError> {
    let mut fields = Vec::new();

    for segment in spec.split(',') {
        let (field, direction) = match segment.split_once(':') {
            Some((field, direction)) => (field.trim(), SortOrder::parse(direction)),
            None => (segment.trim(), SortOrder::Asc),
        };

        if field.is_empty() {
            continue;
        }

        if !allowed.is_empty() && !allowed.iter().any(|a| a == field) {
            return Err(QueryError::SortFieldNotAllowed(field.to_string()));
        }

        fields.push(SortField::new(field, direction));
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_parse_with_allow_list() {
        let fields = parse_sort("name:desc,age", &allow(&["name", "age"])).unwrap();
        assert_eq!(fields, vec![SortField::desc("name"), SortField::asc("age")]);
    }

    #[test]
    fn test_disallowed_field_fails_without_partial_result() {
        let err = parse_sort("name:desc,age", &allow(&["name"])).unwrap_err();
        assert!(matches!(err, QueryError::SortFieldNotAllowed(ref f) if f == "age"));
    }

    #[test]
    fn test_whitespace_and_empty_segments() {
        let fields = parse_sort(" name : DESC ,, :asc, age:sideways ", &[]).unwrap();
        assert_eq!(fields, vec![SortField::desc("name"), SortField::asc("age")]);
    }

    #[test]
    fn test_only_first_colon_splits() {
        let fields = parse_sort("created_at:desc:extra", &[]).unwrap();
        assert_eq!(fields, vec![SortField::asc("created_at")]);
    }

    #[test]
    fn test_empty_spec() {
        assert!(parse_sort("", &allow(&["name"])).unwrap().is_empty());
        assert!(parse_sort(" , ", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_allow_list_is_case_sensitive() {
        let err = parse_sort("Name", &allow(&["name"])).unwrap_err();
        assert!(matches!(err, QueryError::SortFieldNotAllowed(_)));
    }
}
