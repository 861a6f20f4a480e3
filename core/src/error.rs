//! Error types shared by the reader, writer and schema builders.

use thiserror::Error;

use crate::wire::TypeTag;

/// Everything that can go wrong while encoding or decoding a value against a
/// schema.
#[derive(Error, Debug, PartialEq)]
pub enum CodecError {
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: TypeTag,
        found: TypeTag,
        path: String,
    },

    #[error("unknown type tag {0:#04x}")]
    UnknownType(u8),

    #[error("decode was asked to read a struct schema with no declared fields")]
    EmptyStructRead,

    #[error("boolean value written outside of a struct field position")]
    InvalidBooleanContext,

    #[error("writer cannot encode a {0} value")]
    UnsupportedWrite(&'static str),

    #[error("varint did not terminate within the maximum encoded width")]
    VarIntTooLong,

    #[error("unexpected end of buffer")]
    UnexpectedEof,

    #[error("binary field is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("nesting depth exceeded the configured maximum of {max}")]
    DepthExceeded { max: usize },
}

impl From<std::str::Utf8Error> for CodecError {
    fn from(value: std::str::Utf8Error) -> Self {
        Self::InvalidUtf8(value.to_string())
    }
}

/// Mistakes caught at schema-construction time, before any bytes are ever
/// read or written.
#[derive(Error, Debug, PartialEq)]
pub enum SchemaError {
    #[error("map keys must be string, i16 or i32; found {0}")]
    InvalidMapKey(TypeTag),

    #[error("field number {number} is declared with conflicting names {a:?} and {b:?}")]
    FieldNumberCollision { number: i16, a: String, b: String },

    #[error("field name {0:?} is declared more than once in the same struct")]
    DuplicateFieldName(String),
}
