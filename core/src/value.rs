//! The schema-agnostic, dynamically-typed value tree that [`crate::decode`]
//! produces and [`crate::encode`] consumes.

use indexmap::IndexMap;

use crate::wire::TypeTag;

/// A map key, restricted to the types the schema allows as
/// [`crate::schema::SchemaNode::Map`] keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapKey {
    Str(String),
    I16(i16),
    I32(i32),
}

impl MapKey {
    /// The wire type tag this key would encode as.
    pub const fn type_tag(&self) -> TypeTag {
        match self {
            Self::Str(_) => TypeTag::Binary,
            Self::I16(_) => TypeTag::I16,
            Self::I32(_) => TypeTag::I32,
        }
    }
}

impl std::fmt::Display for MapKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::I16(n) => write!(f, "{n}"),
            Self::I32(n) => write!(f, "{n}"),
        }
    }
}

/// A decoded (or about-to-be-encoded) Thrift value.
///
/// This tree is schema-agnostic by itself; its shape is only ever validated
/// *against* a schema, by [`crate::reader::Reader`] on the way in and
/// [`crate::writer::Writer`] on the way out.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Double(f64),
    Float(f32),
    Binary(Vec<u8>),
    Str(String),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(IndexMap<MapKey, Value>),
    Struct(IndexMap<String, Value>),
}

impl Value {
    /// Short, lowercase name of this value's variant.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::Double(_) => "double",
            Self::Float(_) => "float",
            Self::Binary(_) => "binary",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
            Self::Struct(_) => "struct",
        }
    }

    /// The wire type tag this value would encode as, used to report
    /// [`crate::error::CodecError::TypeMismatch`] when a value doesn't match
    /// its schema's declared type.
    pub const fn type_tag(&self) -> TypeTag {
        match self {
            Self::Bool(_) => TypeTag::Bool,
            Self::Byte(_) => TypeTag::Byte,
            Self::I16(_) => TypeTag::I16,
            Self::I32(_) => TypeTag::I32,
            Self::I64(_) => TypeTag::I64,
            Self::Double(_) => TypeTag::Double,
            Self::Float(_) => TypeTag::Float,
            Self::Binary(_) | Self::Str(_) => TypeTag::Binary,
            Self::List(_) => TypeTag::List,
            Self::Set(_) => TypeTag::Set,
            Self::Map(_) => TypeTag::Map,
            Self::Struct(_) => TypeTag::Struct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_key_display() {
        assert_eq!(MapKey::Str("a".to_string()).to_string(), "a");
        assert_eq!(MapKey::I16(7).to_string(), "7");
        assert_eq!(MapKey::I32(-3).to_string(), "-3");
    }

    #[test]
    fn struct_value_equality_is_order_insensitive_for_maps() {
        let mut a = IndexMap::new();
        a.insert(MapKey::Str("x".into()), Value::I32(1));
        a.insert(MapKey::Str("y".into()), Value::I32(2));

        let mut b = IndexMap::new();
        b.insert(MapKey::Str("y".into()), Value::I32(2));
        b.insert(MapKey::Str("x".into()), Value::I32(1));

        assert_eq!(Value::Map(a), Value::Map(b));
    }
}
