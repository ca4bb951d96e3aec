//! Dynamic record mapper
//!
//! Copies fields between two independently declared record shapes by
//! case-insensitive name. A value is assigned directly only when both fields
//! have the same base type (`Option`/`Box` wrappers aside). Otherwise integers,
//! floats and timestamps are written to string fields in their text form, and
//! anything else is skipped. Nested records on both sides are mapped
//! recursively.
//!
//! Field correspondence tables are cached per `(source, target, exclusions)`
//! in a [`FieldMapCache`] when one is supplied.

use crate::errors::QueryError;
use crate::record::{DynRecord, Mappable, RecordShape};
use cache_system::{FieldMap, FieldMapCache};
use std::any::TypeId;
use std::sync::Arc;
use type_mapping::{coerce_to_text, FieldValue};

/// Destination of a mapping: a sequence that may be absent
pub trait TargetSequence {
    type Element: Mappable;

    fn sequence_mut(&mut self) -> Option<&mut Vec<Self::Element>>;
}

impl<E: Mappable> TargetSequence for Vec<E> {
    type Element = E;

    fn sequence_mut(&mut self) -> Option<&mut Vec<E>> {
        Some(self)
    }
}

impl<E: Mappable> TargetSequence for Option<Vec<E>> {
    type Element = E;

    fn sequence_mut(&mut self) -> Option<&mut Vec<E>> {
        self.as_mut()
    }
}

/// Lower-cased, sorted, de-duplicated field names to leave untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludeSet(Vec<String>);

impl ExcludeSet {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let mut lowered: Vec<String> = names
            .iter()
            .map(|name| name.as_ref().to_lowercase())
            .collect();
        lowered.sort();
        lowered.dedup();
        Self(lowered)
    }

    pub fn contains(&self, lowered_name: &str) -> bool {
        self.0.binary_search_by(|n| n.as_str().cmp(lowered_name)).is_ok()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Check that both element types resolve to records
pub fn check_shapes<S: Mappable, E: Mappable>() -> Result<(), QueryError> {
    if S::mapped_shape().is_none() {
        return Err(QueryError::SourceNotRecord(S::type_label().to_string()));
    }
    if E::mapped_shape().is_none() {
        return Err(QueryError::TargetNotRecord(E::type_label().to_string()));
    }
    Ok(())
}

/// Map every source element onto a fresh target element, preserving order.
/// Absent source elements produce a blank target element.
pub fn map_records<S: Mappable, E: Mappable>(
    sources: &[S],
    exclude: &ExcludeSet,
    cache: Option<&FieldMapCache>,
) -> Result<Vec<E>, QueryError> {
    check_shapes::<S, E>()?;

    let mut mapped = Vec::with_capacity(sources.len());
    for source in sources {
        let mut target = E::blank();
        if let (Some(src), Some(dst)) = (source.record_view(), target.record_view_mut()) {
            map_fields(src, dst, exclude, cache);
        }
        mapped.push(target);
    }

    crate::trace_log!(
        source = std::any::type_name::<S>(),
        target = std::any::type_name::<E>(),
        count = mapped.len(),
        "records mapped"
    );
    Ok(mapped)
}

/// Copy matching fields from `source` onto `target` and return how many leaf
/// fields were assigned
pub fn map_fields(
    source: &dyn DynRecord,
    target: &mut dyn DynRecord,
    exclude: &ExcludeSet,
    cache: Option<&FieldMapCache>,
) -> usize {
    let source_shape = source.shape();
    let table = field_table(source_shape, target.shape(), exclude, cache);
    let mut applied = 0;

    for (index, field) in source_shape.fields.iter().enumerate() {
        let lowered = field.name.to_lowercase();
        if exclude.contains(&lowered) {
            continue;
        }
        let Some(target_index) = table.get(&lowered) else {
            continue;
        };

        if let Some(nested_source) = source.nested(index) {
            if let Some(nested_target) = target.nested_mut(target_index) {
                applied += map_fields(nested_source, nested_target, exclude, cache);
                continue;
            }
        }

        let Some(value) = source.field_value(index) else {
            continue;
        };
        let same_type = source.field_type_id(index).is_some()
            && source.field_type_id(index) == target.field_type_id(target_index);
        if assign(target, target_index, value, same_type) {
            applied += 1;
        }
    }

    applied
}

fn assign(target: &mut dyn DynRecord, index: usize, value: FieldValue, same_type: bool) -> bool {
    if same_type {
        return target.set_field(index, value);
    }
    if target.field_type_id(index) != Some(TypeId::of::<String>()) {
        return false;
    }
    match coerce_to_text(&value) {
        Some(text) => target.set_field(index, FieldValue::Text(text)),
        None => false,
    }
}

fn field_table(
    source: &RecordShape,
    target: &RecordShape,
    exclude: &ExcludeSet,
    cache: Option<&FieldMapCache>,
) -> Arc<FieldMap> {
    let build = || FieldMap::from_fields(target.field_names(), |name| exclude.contains(name));
    match cache {
        Some(cache) => {
            let key = FieldMapCache::key(source.type_name, target.type_name, exclude.as_slice());
            cache.get_or_build(&key, build)
        }
        None => Arc::new(build()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Record;
    use chrono::{DateTime, TimeZone, Utc};

    #[derive(Debug, Clone, Default, PartialEq, Record)]
    struct Person {
        name: String,
        age: i64,
        joined_at: DateTime<Utc>,
        score: f64,
        address: Address,
        tags: Vec<String>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Record)]
    struct Address {
        city: String,
        zip: i32,
    }

    #[derive(Debug, Clone, Default, PartialEq, Record)]
    struct PersonText {
        name: String,
        age: String,
        joined_at: String,
        score: String,
        address: AddressText,
        tags: Vec<String>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Record)]
    struct AddressText {
        city: String,
        zip: String,
    }

    #[derive(Debug, Clone, Default, PartialEq, Record)]
    #[allow(non_snake_case)]
    struct LegacyName {
        Name: String,
    }

    #[derive(Debug, Clone, Default, PartialEq, Record)]
    struct Narrow {
        age: i16,
        score: Option<f64>,
        joined_at: Option<String>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Record)]
    struct Widths {
        age: i64,
        small: i32,
        ratio: f32,
    }

    #[derive(Debug, Clone, Default, PartialEq, Record)]
    struct OtherWidths {
        age: i16,
        small: i64,
        ratio: f64,
    }

    fn person() -> Person {
        Person {
            name: "a".into(),
            age: 30,
            joined_at: Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap(),
            score: 2.5,
            address: Address {
                city: "Oslo".into(),
                zip: 150,
            },
            tags: vec!["x".into()],
        }
    }

    #[test]
    fn test_scalars_coerce_to_text() {
        let mapped: Vec<PersonText> = map_records(&[person()], &ExcludeSet::default(), None).unwrap();
        assert_eq!(
            mapped,
            vec![PersonText {
                name: "a".into(),
                age: "30".into(),
                joined_at: "2024-05-06T07:08:09Z".into(),
                score: "2.5".into(),
                address: AddressText {
                    city: "Oslo".into(),
                    zip: "150".into(),
                },
                tags: vec!["x".into()],
            }]
        );
    }

    #[test]
    fn test_exclusion_applies_to_nested_fields() {
        let mapped: Vec<PersonText> =
            map_records(&[person()], &ExcludeSet::new(&["AGE", "zip"]), None).unwrap();
        assert_eq!(mapped[0].age, "");
        assert_eq!(mapped[0].address.zip, "");
        assert_eq!(mapped[0].address.city, "Oslo");
    }

    #[test]
    fn test_field_names_match_case_insensitively() {
        let mapped: Vec<LegacyName> = map_records(&[person()], &ExcludeSet::default(), None).unwrap();
        assert_eq!(mapped[0].Name, "a");
    }

    #[test]
    fn test_numeric_widths_are_not_converted() {
        let mut narrow = Narrow::default();
        let applied = map_fields(&person(), &mut narrow, &ExcludeSet::default(), None);
        assert_eq!(applied, 2);
        assert_eq!(narrow.age, 0);
        assert_eq!(narrow.score, Some(2.5));
        assert_eq!(narrow.joined_at.as_deref(), Some("2024-05-06T07:08:09Z"));

        let source = Widths {
            age: 30,
            small: 7,
            ratio: 0.5,
        };
        let mut target = OtherWidths::default();
        assert_eq!(map_fields(&source, &mut target, &ExcludeSet::default(), None), 0);
        assert_eq!(target, OtherWidths::default());
    }

    #[test]
    fn test_missing_target_fields_are_dropped() {
        let source = PersonText {
            name: "n".into(),
            age: "not a number".into(),
            ..PersonText::default()
        };
        let mut target = Person::default();
        map_fields(&source, &mut target, &ExcludeSet::default(), None);
        assert_eq!(target.name, "n");
        assert_eq!(target.age, 0);
    }

    #[test]
    fn test_indirection_and_absent_sources() {
        let sources: Vec<Option<Person>> = vec![Some(person()), None];
        let mapped: Vec<Box<PersonText>> =
            map_records(&sources, &ExcludeSet::default(), None).unwrap();
        assert_eq!(mapped.len(), 2);
        assert_eq!(mapped[0].age, "30");
        assert_eq!(*mapped[1], PersonText::default());
    }

    #[test]
    fn test_shape_checks_precede_mapping() {
        let sources: Vec<Person> = Vec::new();
        assert!(matches!(
            map_records::<Person, String>(&sources, &ExcludeSet::default(), None),
            Err(QueryError::TargetNotRecord(_))
        ));
    }

    #[test]
    fn test_cache_builds_each_pair_once() {
        let cache = FieldMapCache::new();
        let first: Vec<PersonText> =
            map_records(&[person()], &ExcludeSet::default(), Some(&cache)).unwrap();
        let builds = cache.builds();
        let second: Vec<PersonText> =
            map_records(&[person()], &ExcludeSet::default(), Some(&cache)).unwrap();

        assert_eq!(first, second);
        // top-level pair plus the nested address pair
        assert_eq!(builds, 2);
        assert_eq!(cache.builds(), builds);

        let _: Vec<PersonText> =
            map_records(&[person()], &ExcludeSet::new(&["age"]), Some(&cache)).unwrap();
        assert_eq!(cache.builds(), 4);
    }

    #[test]
    fn test_exclude_set_normalizes() {
        let set = ExcludeSet::new(&["Age", "id", "AGE"]);
        assert_eq!(set.as_slice(), &["age".to_string(), "id".to_string()]);
        assert!(set.contains("age"));
        assert!(!set.contains("name"));
    }

    #[test]
    fn test_absent_target_sequence() {
        let mut target: Option<Vec<String>> = None;
        assert!(target.sequence_mut().is_none());
        let mut present: Option<Vec<String>> = Some(Vec::new());
        assert!(present.sequence_mut().is_some());
    }

    #[test]
    fn test_scalar_elements_are_rejected() {
        assert!(matches!(
            map_records::<i64, String>(&[], &ExcludeSet::default(), None),
            Err(QueryError::SourceNotRecord(ref name)) if name == "i64"
        ));
    }
}
