//! Schema-driven decoding: turns a byte slice plus a [`SchemaRef`] into a
//! [`Value`] tree.

use indexmap::IndexMap;

use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::schema::{SchemaNode, SchemaRef, StructSchema};
use crate::value::{MapKey, Value};
use crate::varint::{
    read_varint_u64, zigzag_decode_16, zigzag_decode_32, zigzag_decode_64,
};
use crate::wire::TypeTag;

/// Decode `bytes` against `schema` using [`CodecConfig::default`].
pub fn decode(bytes: &[u8], schema: &SchemaRef) -> Result<Value, CodecError> {
    decode_with_config(bytes, schema, &CodecConfig::default())
}

/// Decode `bytes` against `schema`, honoring `config`'s recursion limit.
///
/// `schema` must be a [`SchemaNode::Struct`] with at least one field: Compact
/// Protocol messages are always struct-shaped, and a struct schema with no
/// fields can never be told apart from a truncated one.
pub fn decode_with_config(
    bytes: &[u8],
    schema: &SchemaRef,
    config: &CodecConfig,
) -> Result<Value, CodecError> {
    let root = schema.as_struct().ok_or(CodecError::EmptyStructRead)?;
    if root.is_empty() {
        return Err(CodecError::EmptyStructRead);
    }
    let mut reader = Reader {
        bytes,
        cursor: 0,
        config: *config,
        depth: 0,
    };
    reader.read_struct("$", root)
}

struct Reader<'a> {
    bytes: &'a [u8],
    cursor: usize,
    config: CodecConfig,
    depth: usize,
}

impl<'a> Reader<'a> {
    fn enter(&mut self) -> Result<(), CodecError> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            return Err(CodecError::DepthExceeded {
                max: self.config.max_depth,
            });
        }
        Ok(())
    }

    fn exit(&mut self) {
        self.depth -= 1;
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        let byte = *self
            .bytes
            .get(self.cursor)
            .ok_or(CodecError::UnexpectedEof)?;
        self.cursor += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .cursor
            .checked_add(len)
            .ok_or(CodecError::UnexpectedEof)?;
        let slice = self
            .bytes
            .get(self.cursor..end)
            .ok_or(CodecError::UnexpectedEof)?;
        self.cursor = end;
        Ok(slice)
    }

    fn read_varint(&mut self) -> Result<u64, CodecError> {
        read_varint_u64(self.bytes, &mut self.cursor)
    }

    fn read_binary(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.read_varint()? as usize;
        Ok(self.read_bytes(len)?.to_vec())
    }

    fn read_double(&mut self) -> Result<f64, CodecError> {
        let bytes: [u8; 8] = self.read_bytes(8)?.try_into().expect("exactly 8 bytes");
        Ok(f64::from_le_bytes(bytes))
    }

    fn read_float(&mut self) -> Result<f32, CodecError> {
        let bytes: [u8; 4] = self.read_bytes(4)?.try_into().expect("exactly 4 bytes");
        Ok(f32::from_le_bytes(bytes))
    }

    /// Reads a field header, returning `None` at the struct's `Stop` byte.
    /// `prev` is the previous field's number within this struct, updated in
    /// place to support short-form delta encoding.
    fn read_field_header(&mut self, prev: &mut i16) -> Result<Option<(i16, TypeTag)>, CodecError> {
        let byte = self.read_u8()?;
        if byte == 0x00 {
            return Ok(None);
        }
        let delta = (byte >> 4) & 0x0F;
        let wire_type = TypeTag::from_wire(byte & 0x0F).ok_or(CodecError::UnknownType(byte))?;
        let field_id = if delta == 0 {
            zigzag_decode_16(self.read_varint()? as u16)
        } else {
            *prev + i16::from(delta)
        };
        *prev = field_id;
        Ok(Some((field_id, wire_type)))
    }

    fn read_list_header(&mut self) -> Result<(usize, TypeTag), CodecError> {
        let byte = self.read_u8()?;
        let size_nibble = (byte >> 4) & 0x0F;
        let elem_type = TypeTag::from_wire(byte & 0x0F).ok_or(CodecError::UnknownType(byte))?;
        let size = if size_nibble == 0x0F {
            self.read_varint()? as usize
        } else {
            size_nibble as usize
        };
        Ok((size, elem_type))
    }

    fn read_map_header(&mut self) -> Result<(usize, Option<TypeTag>, Option<TypeTag>), CodecError> {
        let size = self.read_varint()? as usize;
        if size == 0 {
            return Ok((0, None, None));
        }
        let byte = self.read_u8()?;
        let key_type = TypeTag::from_wire(byte >> 4).ok_or(CodecError::UnknownType(byte))?;
        let value_type = TypeTag::from_wire(byte & 0x0F).ok_or(CodecError::UnknownType(byte))?;
        Ok((size, Some(key_type), Some(value_type)))
    }

    fn check_match(
        &self,
        expected: TypeTag,
        found: TypeTag,
        path: &str,
    ) -> Result<(), CodecError> {
        if expected.matches(found) {
            Ok(())
        } else {
            Err(CodecError::TypeMismatch {
                expected,
                found,
                path: path.to_string(),
            })
        }
    }

    fn read_map_key(&mut self, schema: &SchemaNode, path: &str) -> Result<MapKey, CodecError> {
        match schema {
            SchemaNode::Binary(_) => {
                let bytes = self.read_binary()?;
                let s = std::str::from_utf8(&bytes)?.to_string();
                Ok(MapKey::Str(s))
            }
            SchemaNode::I16 => Ok(MapKey::I16(zigzag_decode_16(self.read_varint()? as u16))),
            SchemaNode::I32 => Ok(MapKey::I32(zigzag_decode_32(self.read_varint()? as u32))),
            other => Err(CodecError::TypeMismatch {
                expected: other.type_tag(),
                found: other.type_tag(),
                path: path.to_string(),
            }),
        }
    }

    /// Decode a value whose wire tag has already been checked against
    /// `schema` by the caller (field read, or container header). `schema` is
    /// never `Bool` here: a boolean is only ever valid in struct field
    /// position, which [`Self::read_struct`] special-cases before reaching
    /// this method, so a list/set/map of booleans is always rejected.
    fn read_value(&mut self, schema: &SchemaNode, path: &str) -> Result<Value, CodecError> {
        match schema {
            SchemaNode::Bool => Err(CodecError::InvalidBooleanContext),
            SchemaNode::Byte => Ok(Value::Byte(self.read_u8()? as i8)),
            SchemaNode::I16 => Ok(Value::I16(zigzag_decode_16(self.read_varint()? as u16))),
            SchemaNode::I32 => Ok(Value::I32(zigzag_decode_32(self.read_varint()? as u32))),
            SchemaNode::I64 => Ok(Value::I64(zigzag_decode_64(self.read_varint()?))),
            SchemaNode::Double => Ok(Value::Double(self.read_double()?)),
            SchemaNode::Float => Ok(Value::Float(self.read_float()?)),
            SchemaNode::Binary(crate::schema::BinaryKind::Bytes) => {
                Ok(Value::Binary(self.read_binary()?))
            }
            SchemaNode::Binary(crate::schema::BinaryKind::String) => {
                let bytes = self.read_binary()?;
                Ok(Value::Str(std::str::from_utf8(&bytes)?.to_string()))
            }
            SchemaNode::List(item) => {
                let (size, wire_elem) = self.read_list_header()?;
                self.check_match(item.type_tag(), wire_elem, path)?;
                self.enter()?;
                let mut values = Vec::with_capacity(size);
                for i in 0..size {
                    let elem_path = format!("{path}[{i}]");
                    values.push(self.read_value(item, &elem_path)?);
                }
                self.exit();
                Ok(Value::List(values))
            }
            SchemaNode::Set(item) => {
                let (size, wire_elem) = self.read_list_header()?;
                self.check_match(item.type_tag(), wire_elem, path)?;
                self.enter()?;
                let mut values = Vec::with_capacity(size);
                for i in 0..size {
                    let elem_path = format!("{path}[{i}]");
                    values.push(self.read_value(item, &elem_path)?);
                }
                self.exit();
                Ok(Value::Set(values))
            }
            SchemaNode::Map { key, value } => {
                let (size, wire_key, wire_value) = self.read_map_header()?;
                if size == 0 {
                    return Ok(Value::Map(IndexMap::new()));
                }
                let wire_key = wire_key.expect("non-empty map carries a key type");
                let wire_value = wire_value.expect("non-empty map carries a value type");
                self.check_match(key.type_tag(), wire_key, path)?;
                self.check_match(value.type_tag(), wire_value, path)?;
                self.enter()?;
                let mut map = IndexMap::with_capacity(size);
                for i in 0..size {
                    let entry_path = format!("{path}{{{i}}}");
                    let k = self.read_map_key(key, &entry_path)?;
                    let v = self.read_value(value, &entry_path)?;
                    map.insert(k, v);
                }
                self.exit();
                Ok(Value::Map(map))
            }
            SchemaNode::Struct(fields) => self.read_struct(path, fields),
        }
    }

    fn read_struct(&mut self, path: &str, schema: &StructSchema) -> Result<Value, CodecError> {
        self.enter()?;
        let mut prev = 0i16;
        let mut fields = IndexMap::new();
        while let Some((field_id, wire_type)) = self.read_field_header(&mut prev)? {
            match schema.field_by_number(field_id) {
                Some((name, descriptor)) => {
                    let field_path = format!("{path}.{name}");
                    let value = if descriptor.schema.type_tag() == TypeTag::Bool {
                        match wire_type {
                            TypeTag::True => Value::Bool(true),
                            TypeTag::False => Value::Bool(false),
                            found => {
                                return Err(CodecError::TypeMismatch {
                                    expected: TypeTag::Bool,
                                    found,
                                    path: field_path,
                                });
                            }
                        }
                    } else {
                        self.check_match(descriptor.schema.type_tag(), wire_type, &field_path)?;
                        self.read_value(&descriptor.schema, &field_path)?
                    };
                    fields.insert(name.to_string(), value);
                }
                None => {
                    tracing::debug!(field_id, %wire_type, path, "skipping unknown field");
                    self.skip_value(wire_type, false)?;
                }
            }
        }
        self.exit();
        Ok(Value::Struct(fields))
    }

    /// Consumes a value's bytes without interpreting them, for fields not
    /// present in the schema. Mirrors [`Self::read_value`]'s wire walk but
    /// without any schema to validate against.
    ///
    /// `in_container` distinguishes the two shapes a boolean can take on the
    /// wire: as a struct field, `True`/`False` is carried entirely in the
    /// header with no trailing byte; as a list/set/map element it is a plain
    /// one-byte value following the `True`-tagged element-type marker.
    fn skip_value(&mut self, wire_type: TypeTag, in_container: bool) -> Result<(), CodecError> {
        match wire_type {
            TypeTag::True | TypeTag::False => {
                if in_container {
                    self.read_u8().map(|_| ())
                } else {
                    Ok(())
                }
            }
            TypeTag::Byte => self.read_u8().map(|_| ()),
            TypeTag::I16 | TypeTag::I32 | TypeTag::I64 => self.read_varint().map(|_| ()),
            TypeTag::Double => self.read_double().map(|_| ()),
            TypeTag::Float => self.read_float().map(|_| ()),
            TypeTag::Binary => self.read_binary().map(|_| ()),
            TypeTag::List | TypeTag::Set => {
                let (size, elem_type) = self.read_list_header()?;
                self.enter()?;
                for _ in 0..size {
                    self.skip_value(elem_type, true)?;
                }
                self.exit();
                Ok(())
            }
            TypeTag::Map => {
                let (size, key_type, value_type) = self.read_map_header()?;
                if size == 0 {
                    return Ok(());
                }
                let key_type = key_type.expect("non-empty map carries a key type");
                let value_type = value_type.expect("non-empty map carries a value type");
                self.enter()?;
                for _ in 0..size {
                    self.skip_value(key_type, true)?;
                    self.skip_value(value_type, true)?;
                }
                self.exit();
                Ok(())
            }
            TypeTag::Struct => {
                self.enter()?;
                let mut prev = 0i16;
                while let Some((_, inner_type)) = self.read_field_header(&mut prev)? {
                    self.skip_value(inner_type, false)?;
                }
                self.exit();
                Ok(())
            }
            TypeTag::Stop | TypeTag::Bool => unreachable!("not a value-bearing wire tag"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::build;

    #[test]
    fn decodes_simple_struct() {
        let schema = build::struct_([("id", build::field(1, build::i32_()))]).unwrap();
        // field header: delta=1, type=I32(0x05) -> 0x15; zigzag(7)=14 -> varint 0x0E; stop 0x00
        let bytes = [0x15, 0x0E, 0x00];
        let value = decode(&bytes, &schema).unwrap();
        let mut expected = IndexMap::new();
        expected.insert("id".to_string(), Value::I32(7));
        assert_eq!(value, Value::Struct(expected));
    }

    #[test]
    fn rejects_empty_struct_schema() {
        let schema = build::struct_([]).unwrap();
        let err = decode(&[0x00], &schema).unwrap_err();
        assert_eq!(err, CodecError::EmptyStructRead);
    }

    #[test]
    fn skips_unknown_fields() {
        let schema = build::struct_([("id", build::field(2, build::i32_()))]).unwrap();
        // field 1 (unknown, byte) = 0x13, 0x05; field 2 (i32) delta=1 -> 0x15, zigzag(2)=4 -> 0x04; stop
        let bytes = [0x13, 0x05, 0x15, 0x04, 0x00];
        let value = decode(&bytes, &schema).unwrap();
        let mut expected = IndexMap::new();
        expected.insert("id".to_string(), Value::I32(2));
        assert_eq!(value, Value::Struct(expected));
    }

    #[test]
    fn type_mismatch_reports_path() {
        let schema = build::struct_([("id", build::field(1, build::i32_()))]).unwrap();
        // field 1 encoded as binary (0x08) instead of i32
        let bytes = [0x18, 0x00, 0x00];
        let err = decode(&bytes, &schema).unwrap_err();
        assert_eq!(
            err,
            CodecError::TypeMismatch {
                expected: TypeTag::I32,
                found: TypeTag::Binary,
                path: "$.id".to_string(),
            }
        );
    }

    #[test]
    fn depth_guard_trips_on_deep_nesting() {
        let inner = build::struct_([("n", build::field(1, build::i32_()))]).unwrap();
        let schema = build::struct_([("child", build::field(1, inner))]).unwrap();
        let config = CodecConfig::new(1);
        // one nested struct field is already depth 2: root struct (depth 1) + child struct (depth 2)
        let bytes = [0x1C, 0x15, 0x0E, 0x00, 0x00];
        let err = decode_with_config(&bytes, &schema, &config).unwrap_err();
        assert_eq!(err, CodecError::DepthExceeded { max: 1 });
    }

    #[test]
    fn truncated_buffer_is_unexpected_eof() {
        let schema = build::struct_([("id", build::field(1, build::i32_()))]).unwrap();
        let bytes = [0x15];
        let err = decode(&bytes, &schema).unwrap_err();
        assert_eq!(err, CodecError::UnexpectedEof);
    }

    #[test]
    fn bool_list_elements_are_rejected() {
        let schema = build::struct_([("flags", build::field(1, build::list(build::bool_())))]).unwrap();
        // field header: delta=1,type=List(9)->0x19; list header: len=1,elem=True(1)->0x11; one element byte
        let bytes = [0x19, 0x11, 0x01, 0x00];
        let err = decode(&bytes, &schema).unwrap_err();
        assert_eq!(err, CodecError::InvalidBooleanContext);
    }
}
