use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::SchemaError;
use crate::wire::TypeTag;

/// Schema nodes are constructed once and shared freely; `Arc` lets a single
/// item/key/value schema be referenced from many containers without cloning
/// the tree.
pub type SchemaRef = Arc<SchemaNode>;

/// Whether a [`SchemaNode::Binary`] decodes to a UTF-8 [`crate::value::Value::Str`]
/// or a raw [`crate::value::Value::Binary`]. The wire encoding is identical either
/// way; this is purely a decode-side/encode-side typing choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryKind {
    String,
    Bytes,
}

/// A field within a [`StructSchema`]: its wire identity (`number`), its type,
/// and whether it is permitted to be absent from a decoded/encoded value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub number: i16,
    pub schema: SchemaRef,
    pub optional: bool,
}

impl FieldDescriptor {
    pub fn new(number: i16, schema: SchemaRef) -> Self {
        Self {
            number,
            schema,
            optional: false,
        }
    }

    /// Mark this field as optional. Purely a type-surface marker: see
    /// [`crate::schema`] module docs — it never changes wire behavior.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// An ordered, named collection of fields. Order is declaration order, which
/// is also the order the writer emits fields in.
#[derive(Debug, Clone, PartialEq)]
pub struct StructSchema {
    pub(crate) fields: IndexMap<String, FieldDescriptor>,
}

impl StructSchema {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn field_by_number(&self, number: i16) -> Option<(&str, &FieldDescriptor)> {
        self.fields
            .iter()
            .find(|(_, field)| field.number == number)
            .map(|(name, field)| (name.as_str(), field))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Union this struct's fields with `other`'s, with `other`'s entries
    /// overriding on name collision. Rejects field-number collisions between
    /// differently-named fields: a schema where two names quietly share a
    /// wire number can never round-trip consistently, so this is caught here
    /// rather than surfacing as a confusing decode-time `TypeMismatch` later.
    pub fn merged_with(&self, other: &StructSchema) -> Result<StructSchema, SchemaError> {
        let mut fields = self.fields.clone();
        for (name, field) in &other.fields {
            if let Some((existing_name, existing_field)) = fields
                .iter()
                .find(|(existing_name, f)| f.number == field.number && *existing_name != name)
            {
                return Err(SchemaError::FieldNumberCollision {
                    number: field.number,
                    a: existing_name.clone(),
                    b: name.clone(),
                });
            }
            fields.insert(name.clone(), field.clone());
        }
        Ok(StructSchema { fields })
    }
}

/// A Thrift type descriptor.
///
/// `SchemaNode` is a closed sum type: every Compact Protocol type tag except
/// `Stop` has exactly one corresponding variant. Nodes are immutable after
/// construction (see [`crate::schema::build`]) and contain no values, only
/// shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    Float,
    Binary(BinaryKind),
    List(SchemaRef),
    Set(SchemaRef),
    Map { key: SchemaRef, value: SchemaRef },
    Struct(StructSchema),
}

impl SchemaNode {
    /// The wire type tag this node encodes/decodes as.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::Bool => TypeTag::Bool,
            Self::Byte => TypeTag::Byte,
            Self::I16 => TypeTag::I16,
            Self::I32 => TypeTag::I32,
            Self::I64 => TypeTag::I64,
            Self::Double => TypeTag::Double,
            Self::Float => TypeTag::Float,
            Self::Binary(_) => TypeTag::Binary,
            Self::List(_) => TypeTag::List,
            Self::Set(_) => TypeTag::Set,
            Self::Map { .. } => TypeTag::Map,
            Self::Struct(_) => TypeTag::Struct,
        }
    }

    pub fn as_struct(&self) -> Option<&StructSchema> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }
}

/// Incrementally assembles a [`StructSchema`].
///
/// The plain `struct_(fields)` factory in [`crate::schema::build`] covers the
/// common case of listing every field up front; `StructBuilder` exists for
/// callers assembling a struct's shape conditionally (e.g. generated code
/// adding optional fields based on a model's own feature flags).
#[derive(Debug, Default)]
pub struct StructBuilder {
    fields: IndexMap<String, FieldDescriptor>,
}

impl StructBuilder {
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    /// Add a field. Panics if `name` was already added to this builder — a
    /// duplicate field name within one struct literal is always a programmer
    /// mistake made at schema-definition time, not a recoverable runtime
    /// condition.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: FieldDescriptor) -> Self {
        let name = name.into();
        if self.fields.contains_key(&name) {
            panic!("duplicate field name {name:?} in struct schema");
        }
        self.fields.insert(name, field);
        self
    }

    /// Fallible counterpart to [`Self::field`], for callers that build field
    /// lists from data they don't control up front (e.g. [`crate::schema::build::struct_`]).
    pub fn try_field(mut self, name: impl Into<String>, field: FieldDescriptor) -> Result<Self, SchemaError> {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return Err(SchemaError::DuplicateFieldName(name));
        }
        self.fields.insert(name, field);
        Ok(self)
    }

    pub fn build(self) -> SchemaRef {
        Arc::new(SchemaNode::Struct(StructSchema {
            fields: self.fields,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::build;

    #[test]
    fn field_optional_marker() {
        let field = FieldDescriptor::new(1, build::i32_());
        assert!(!field.optional);
        let field = field.optional();
        assert!(field.optional);
    }

    #[test]
    fn struct_builder_assembles_in_order() {
        let schema = StructBuilder::new()
            .field("a", FieldDescriptor::new(1, build::i32_()))
            .field("b", FieldDescriptor::new(2, build::string()))
            .build();
        let names: Vec<_> = schema
            .as_struct()
            .unwrap()
            .iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    #[should_panic(expected = "duplicate field name")]
    fn struct_builder_rejects_duplicate_names() {
        StructBuilder::new()
            .field("a", FieldDescriptor::new(1, build::i32_()))
            .field("a", FieldDescriptor::new(2, build::i32_()));
    }

    #[test]
    fn try_field_rejects_duplicate_names() {
        let err = StructBuilder::new()
            .try_field("a", FieldDescriptor::new(1, build::i32_()))
            .unwrap()
            .try_field("a", FieldDescriptor::new(2, build::i32_()))
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateFieldName("a".to_string()));
    }

    #[test]
    fn merge_overrides_on_name_collision() {
        let a = StructBuilder::new()
            .field("a", FieldDescriptor::new(1, build::i32_()))
            .build();
        let b = StructBuilder::new()
            .field("a", FieldDescriptor::new(1, build::string()))
            .field("b", FieldDescriptor::new(2, build::bool_()))
            .build();
        let merged = a
            .as_struct()
            .unwrap()
            .merged_with(b.as_struct().unwrap())
            .unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.field("a").unwrap().schema.type_tag(), TypeTag::Binary);
        assert_eq!(merged.field("b").unwrap().schema.type_tag(), TypeTag::Bool);
    }

    #[test]
    fn merge_rejects_number_collision_across_names() {
        let a = StructBuilder::new()
            .field("a", FieldDescriptor::new(1, build::i32_()))
            .build();
        let b = StructBuilder::new()
            .field("renamed", FieldDescriptor::new(1, build::i32_()))
            .build();
        let err = a
            .as_struct()
            .unwrap()
            .merged_with(b.as_struct().unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::FieldNumberCollision {
                number: 1,
                a: "a".to_string(),
                b: "renamed".to_string(),
            }
        );
    }
}
