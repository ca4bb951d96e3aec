//! Field correspondence table
//!
//! Maps lower-cased field names to the index of the matching field on a
//! target record shape.

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    indexes: HashMap<String, usize>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from target field names, skipping names for which
    /// `excluded` returns true. Names are lower-cased before lookup and storage.
    pub fn from_fields<'a, I, F>(names: I, excluded: F) -> Self
    where
        I: IntoIterator<Item = &'a str>,
        F: Fn(&str) -> bool,
    {
        let mut indexes = HashMap::new();
        for (index, name) in names.into_iter().enumerate() {
            let lowered = name.to_lowercase();
            if !excluded(&lowered) {
                indexes.insert(lowered, index);
            }
        }
        Self { indexes }
    }

    /// Target index for an already lower-cased field name
    pub fn get(&self, lowered_name: &str) -> Option<usize> {
        self.indexes.get(lowered_name).copied()
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_lowercased() {
        let map = FieldMap::from_fields(["Name", "AGE"], |_| false);
        assert_eq!(map.get("name"), Some(0));
        assert_eq!(map.get("age"), Some(1));
        assert_eq!(map.get("Name"), None);
    }

    #[test]
    fn test_excluded_names_are_skipped() {
        let map = FieldMap::from_fields(["id", "name", "age"], |n| n == "age");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("age"), None);
        assert_eq!(map.get("name"), Some(1));
    }
}
