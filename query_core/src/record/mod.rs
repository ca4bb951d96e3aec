//! Record abstraction
//!
//! A record is a plain struct with `#[derive(Record)]`. The derive produces a
//! static [`RecordShape`] and index-based field access through [`DynRecord`],
//! which is all the query builder and the mapper need to work with arbitrary
//! record types.

mod field_type;

pub use field_type::FieldType;

use type_mapping::FieldValue;

/// Eager-load relation declared on a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationDef {
    pub table: &'static str,
    /// Column on the related table pointing back at the owner
    pub foreign_key: &'static str,
    /// Column on the owner table the foreign key refers to
    pub references: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub relation: Option<RelationDef>,
}

/// Static description of a record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordShape {
    /// Fully qualified Rust type name, used for cache keys and nested values
    pub type_name: &'static str,
    pub table: &'static str,
    pub fields: &'static [FieldDef],
}

impl RecordShape {
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Relation field by name
    pub fn relation(&self, name: &str) -> Option<(usize, &RelationDef)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.name == name)
            .and_then(|(index, field)| field.relation.as_ref().map(|rel| (index, rel)))
    }

    /// Columns stored on the record's own table
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|field| field.relation.is_none())
            .map(|field| field.name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }
}

/// Object-safe, index-based access to a record's fields
pub trait DynRecord: Send + Sync {
    fn shape(&self) -> &'static RecordShape;

    fn field_value(&self, index: usize) -> Option<FieldValue>;

    /// Base type of the field, see [`FieldType::base_type_id`]
    fn field_type_id(&self, index: usize) -> Option<std::any::TypeId>;

    /// Assign a value when it is representable in the field's type without
    /// formatting. Returns false and leaves the field untouched otherwise.
    fn set_field(&mut self, index: usize, value: FieldValue) -> bool;

    /// Assign from a JSON value, as found in aggregated relation rows
    fn set_json(&mut self, index: usize, value: serde_json::Value) -> bool;

    /// The field as a nested record, if it holds one
    fn nested(&self, index: usize) -> Option<&dyn DynRecord>;

    fn nested_mut(&mut self, index: usize) -> Option<&mut dyn DynRecord>;
}

/// A queryable record type
pub trait Record: DynRecord + Mappable + Default + 'static {
    fn record_shape() -> &'static RecordShape;
}

/// An element type the mapper can read from or write to. Records map
/// directly; `Box` and `Option` add one level of indirection; scalars report
/// no shape and are rejected before any element is touched.
pub trait Mappable: Sized {
    fn mapped_shape() -> Option<&'static RecordShape>;

    fn type_label() -> &'static str {
        std::any::type_name::<Self>()
    }

    fn record_view(&self) -> Option<&dyn DynRecord>;

    fn record_view_mut(&mut self) -> Option<&mut dyn DynRecord>;

    /// Zero value used for absent source elements and as the mapping base
    fn blank() -> Self;
}

impl<R: Record> Mappable for Box<R> {
    fn mapped_shape() -> Option<&'static RecordShape> {
        Some(R::record_shape())
    }

    fn record_view(&self) -> Option<&dyn DynRecord> {
        Some(self.as_ref())
    }

    fn record_view_mut(&mut self) -> Option<&mut dyn DynRecord> {
        Some(self.as_mut())
    }

    fn blank() -> Self {
        Box::default()
    }
}

impl<R: Record> Mappable for Option<R> {
    fn mapped_shape() -> Option<&'static RecordShape> {
        Some(R::record_shape())
    }

    fn record_view(&self) -> Option<&dyn DynRecord> {
        self.as_ref().map(|record| record as &dyn DynRecord)
    }

    fn record_view_mut(&mut self) -> Option<&mut dyn DynRecord> {
        self.as_mut().map(|record| record as &mut dyn DynRecord)
    }

    fn blank() -> Self {
        Some(R::default())
    }
}

macro_rules! scalar_mappable {
    ($($t:ty),* $(,)?) => {
        $(
            impl Mappable for $t {
                fn mapped_shape() -> Option<&'static RecordShape> {
                    None
                }

                fn record_view(&self) -> Option<&dyn DynRecord> {
                    None
                }

                fn record_view_mut(&mut self) -> Option<&mut dyn DynRecord> {
                    None
                }

                fn blank() -> Self {
                    <$t>::default()
                }
            }
        )*
    };
}

scalar_mappable!(
    bool,
    i16,
    i32,
    i64,
    u32,
    u64,
    f32,
    f64,
    String,
    chrono::DateTime<chrono::Utc>,
    uuid::Uuid,
    serde_json::Value,
);

/// Nested-value form of a record
pub fn record_to_value<R: Record>(record: &R) -> FieldValue {
    let shape = R::record_shape();
    FieldValue::Record {
        type_name: shape.type_name.to_string(),
        fields: shape
            .fields
            .iter()
            .enumerate()
            .filter_map(|(index, field)| {
                record
                    .field_value(index)
                    .map(|value| (field.name.to_string(), value))
            })
            .collect(),
    }
}

/// Rebuild a record from its nested-value form or from a JSON object.
/// A nested value produced by a different record type is rejected.
pub fn record_from_value<R: Record>(value: FieldValue) -> Option<R> {
    let shape = R::record_shape();
    match value {
        FieldValue::Record { type_name, fields } if type_name == shape.type_name => {
            let mut out = R::default();
            for (name, value) in fields {
                if let Some(index) = shape.index_of(&name) {
                    out.set_field(index, value);
                }
            }
            Some(out)
        }
        FieldValue::Json(json) => record_from_json(json),
        _ => None,
    }
}

/// Rebuild a record from a JSON object, matching keys to field names
pub fn record_from_json<R: Record>(value: serde_json::Value) -> Option<R> {
    let serde_json::Value::Object(map) = value else {
        return None;
    };
    let shape = R::record_shape();
    let mut out = R::default();
    for (key, value) in map {
        if let Some(index) = shape.index_of(&key) {
            out.set_json(index, value);
        }
    }
    Some(out)
}
