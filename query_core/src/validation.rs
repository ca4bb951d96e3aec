//! Validation module
//!
//! Table references in join conditions are interpolated into SQL text, so they
//! are checked against a strict character set before use.

use std::fmt;

/// Validation errors for join table references
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Reference is empty or only whitespace
    Empty,
    /// Reference contains characters other than ASCII letters, digits, underscore and space
    InvalidCharacters(String),
    /// Reference is longer than a table name plus alias can be
    TooLong {
        name: String,
        length: usize,
        max_length: usize,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Empty => {
                write!(f, "Table reference cannot be empty")
            }
            ValidationError::InvalidCharacters(name) => {
                write!(f, "Invalid characters in table reference '{}': only letters, digits, underscores and spaces are allowed", name)
            }
            ValidationError::TooLong {
                name,
                length,
                max_length,
            } => {
                write!(
                    f,
                    "Table reference '{}' is too long: {} characters (max {})",
                    name, length, max_length
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A join table reference (`orders` or `orders o`) that is safe to place in SQL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedJoinTable(String);

impl ValidatedJoinTable {
    /// Two PostgreSQL identifiers and a separating space
    const MAX_LENGTH: usize = 127;

    pub fn new(name: &str) -> Result<Self, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::Empty);
        }

        if name.len() > Self::MAX_LENGTH {
            return Err(ValidationError::TooLong {
                name: name.to_string(),
                length: name.len(),
                max_length: Self::MAX_LENGTH,
            });
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ')
        {
            return Err(ValidationError::InvalidCharacters(name.to_string()));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ValidatedJoinTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn is_valid_join_table(name: &str) -> bool {
    ValidatedJoinTable::new(name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_join_tables() {
        let valid = ["users", "users u", "order_items oi", "t2", "Accounts"];
        for name in valid {
            assert!(is_valid_join_table(name), "Should accept: {}", name);
        }
    }

    #[test]
    fn test_invalid_join_tables() {
        let test_cases = [
            ("", ValidationError::Empty),
            ("   ", ValidationError::Empty),
            (
                "users; drop table x",
                ValidationError::InvalidCharacters("users; drop table x".to_string()),
            ),
            (
                "users--",
                ValidationError::InvalidCharacters("users--".to_string()),
            ),
            (
                "public.users",
                ValidationError::InvalidCharacters("public.users".to_string()),
            ),
            (
                "users\tu",
                ValidationError::InvalidCharacters("users\tu".to_string()),
            ),
        ];

        for (name, expected) in test_cases {
            assert_eq!(ValidatedJoinTable::new(name).unwrap_err(), expected);
        }
    }

    #[test]
    fn test_too_long_reference() {
        let name = "a".repeat(128);
        match ValidatedJoinTable::new(&name).unwrap_err() {
            ValidationError::TooLong { length, max_length, .. } => {
                assert_eq!(length, 128);
                assert_eq!(max_length, 127);
            }
            other => panic!("Expected TooLong error, got {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        let table = ValidatedJoinTable::new("orders o").unwrap();
        assert_eq!(format!("{}", table), "orders o");
    }
}
