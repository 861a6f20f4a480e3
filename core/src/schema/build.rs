//! Plain factory functions for constructing [`SchemaNode`]s. This is the
//! fluent construction surface mentioned in the crate's public interface: it
//! has no logic of its own beyond instantiating nodes (and, for `map`,
//! checking the key restriction once up front).

use std::sync::Arc;

use crate::error::SchemaError;
use crate::schema::node::{BinaryKind, FieldDescriptor, SchemaNode, SchemaRef};
use crate::wire::TypeTag;

pub fn bool_() -> SchemaRef {
    Arc::new(SchemaNode::Bool)
}

pub fn byte() -> SchemaRef {
    Arc::new(SchemaNode::Byte)
}

pub fn i16_() -> SchemaRef {
    Arc::new(SchemaNode::I16)
}

pub fn i32_() -> SchemaRef {
    Arc::new(SchemaNode::I32)
}

pub fn i64_() -> SchemaRef {
    Arc::new(SchemaNode::I64)
}

pub fn double() -> SchemaRef {
    Arc::new(SchemaNode::Double)
}

pub fn float() -> SchemaRef {
    Arc::new(SchemaNode::Float)
}

pub fn string() -> SchemaRef {
    Arc::new(SchemaNode::Binary(BinaryKind::String))
}

pub fn binary() -> SchemaRef {
    Arc::new(SchemaNode::Binary(BinaryKind::Bytes))
}

pub fn list(item: SchemaRef) -> SchemaRef {
    Arc::new(SchemaNode::List(item))
}

pub fn set(item: SchemaRef) -> SchemaRef {
    Arc::new(SchemaNode::Set(item))
}

/// Build a map schema. Fails if `key`'s type is not one of the map-key-safe
/// types (`string`, `i16`, `i32`) — see [`crate::schema`] module docs.
pub fn map(key: SchemaRef, value: SchemaRef) -> Result<SchemaRef, SchemaError> {
    match key.type_tag() {
        TypeTag::Binary if matches!(&*key, SchemaNode::Binary(BinaryKind::String)) => {}
        TypeTag::I16 | TypeTag::I32 => {}
        other => return Err(SchemaError::InvalidMapKey(other)),
    }
    Ok(Arc::new(SchemaNode::Map { key, value }))
}

/// Build a struct schema from a complete, known-up-front field list. Fails if
/// the same field name appears twice.
pub fn struct_<'a>(
    fields: impl IntoIterator<Item = (&'a str, FieldDescriptor)>,
) -> Result<SchemaRef, SchemaError> {
    let mut builder = crate::schema::StructBuilder::new();
    for (name, field) in fields {
        builder = builder.try_field(name, field)?;
    }
    Ok(builder.build())
}

/// Build a non-optional field descriptor. Chain `.optional()` for optional
/// fields.
pub fn field(number: i16, schema: SchemaRef) -> FieldDescriptor {
    FieldDescriptor::new(number, schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_accepts_string_key() {
        assert!(map(string(), i32_()).is_ok());
    }

    #[test]
    fn map_accepts_i16_and_i32_keys() {
        assert!(map(i16_(), string()).is_ok());
        assert!(map(i32_(), string()).is_ok());
    }

    #[test]
    fn map_rejects_binary_key() {
        let err = map(binary(), string()).unwrap_err();
        assert_eq!(err, SchemaError::InvalidMapKey(TypeTag::Binary));
    }

    #[test]
    fn map_rejects_non_scalar_key() {
        let err = map(list(i32_()), string()).unwrap_err();
        assert_eq!(err, SchemaError::InvalidMapKey(TypeTag::List));
    }

    #[test]
    fn struct_factory_builds_in_declaration_order() {
        let schema = struct_([("a", field(1, i32_())), ("b", field(2, string()))]).unwrap();
        let names: Vec<_> = schema
            .as_struct()
            .unwrap()
            .iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn struct_factory_rejects_duplicate_field_names() {
        let err = struct_([("a", field(1, i32_())), ("a", field(2, string()))]).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateFieldName("a".to_string()));
    }
}
