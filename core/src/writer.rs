//! Schema-driven encoding: turns a [`Value`] tree plus a [`SchemaRef`] into
//! Compact Protocol bytes.

use bytebuffer::ByteBuffer;
use indexmap::IndexMap;

use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::schema::{BinaryKind, SchemaNode, SchemaRef, StructSchema};
use crate::value::{MapKey, Value};
use crate::varint::{write_varint_u64, zigzag_encode_16, zigzag_encode_32, zigzag_encode_64};
use crate::wire::TypeTag;

/// Encode `value` against `schema` using [`CodecConfig::default`].
pub fn encode(value: &Value, schema: &SchemaRef) -> Result<Vec<u8>, CodecError> {
    encode_with_config(value, schema, &CodecConfig::default())
}

/// Encode `value` against `schema`, honoring `config`'s recursion limit.
///
/// `schema` must be a [`SchemaNode::Struct`] with at least one field, and
/// `value` must be a [`Value::Struct`]: see [`crate::reader::decode`]'s
/// symmetric requirement.
pub fn encode_with_config(
    value: &Value,
    schema: &SchemaRef,
    config: &CodecConfig,
) -> Result<Vec<u8>, CodecError> {
    let root = schema.as_struct().ok_or(CodecError::EmptyStructRead)?;
    if root.is_empty() {
        return Err(CodecError::EmptyStructRead);
    }
    let Value::Struct(fields) = value else {
        return Err(CodecError::TypeMismatch {
            expected: TypeTag::Struct,
            found: value.type_tag(),
            path: "$".to_string(),
        });
    };
    let mut writer = Writer {
        buffer: ByteBuffer::new(),
        config: *config,
        depth: 0,
    };
    writer.write_struct("$", fields, root)?;
    Ok(writer.buffer.into_vec())
}

struct Writer {
    buffer: ByteBuffer,
    config: CodecConfig,
    depth: usize,
}

impl Writer {
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

    fn write_varint(&mut self, value: u64) {
        write_varint_u64(&mut self.buffer, value);
    }

    fn write_binary(&mut self, bytes: &[u8]) {
        self.write_varint(bytes.len() as u64);
        self.buffer.write_bytes(bytes);
    }

    /// Writes a field header for `(number, type)`, choosing short-form delta
    /// encoding when possible. Returns the field number so the caller can
    /// thread it through as the next field's `prev`.
    fn write_field_header(&mut self, prev: i16, number: i16, wire_type: TypeTag) -> i16 {
        let delta = i64::from(number) - i64::from(prev);
        if (1..=15).contains(&delta) {
            self.buffer.write_u8((delta as u8) << 4 | wire_type.to_wire());
        } else {
            self.buffer.write_u8(wire_type.to_wire());
            self.write_varint(u64::from(zigzag_encode_16(number)));
        }
        number
    }

    fn write_list_header(&mut self, len: usize, elem_tag: TypeTag) {
        let elem_nibble = if elem_tag == TypeTag::Bool {
            TypeTag::True.to_wire()
        } else {
            elem_tag.to_wire()
        };
        if len < 15 {
            self.buffer.write_u8((len as u8) << 4 | elem_nibble);
        } else {
            self.buffer.write_u8(0xF0 | elem_nibble);
            self.write_varint(len as u64);
        }
    }

    fn write_map_header(&mut self, len: usize, key_tag: TypeTag, value_tag: TypeTag) {
        self.write_varint(len as u64);
        if len == 0 {
            return;
        }
        let key_nibble = if key_tag == TypeTag::Bool {
            TypeTag::True.to_wire()
        } else {
            key_tag.to_wire()
        };
        let value_nibble = if value_tag == TypeTag::Bool {
            TypeTag::True.to_wire()
        } else {
            value_tag.to_wire()
        };
        self.buffer.write_u8(key_nibble << 4 | value_nibble);
    }

    fn write_map_key(&mut self, key: &MapKey, schema: &SchemaNode, path: &str) -> Result<(), CodecError> {
        match (schema, key) {
            (SchemaNode::Binary(_), MapKey::Str(s)) => {
                self.write_binary(s.as_bytes());
                Ok(())
            }
            (SchemaNode::I16, MapKey::I16(n)) => {
                self.write_varint(u64::from(zigzag_encode_16(*n)));
                Ok(())
            }
            (SchemaNode::I32, MapKey::I32(n)) => {
                self.write_varint(u64::from(zigzag_encode_32(*n)));
                Ok(())
            }
            (_, other) => Err(CodecError::TypeMismatch {
                expected: schema.type_tag(),
                found: other.type_tag(),
                path: path.to_string(),
            }),
        }
    }

    /// Writes a non-boolean value. Struct-field booleans are special-cased by
    /// [`Self::write_struct`] before reaching here; a `Bool` schema arriving
    /// here means the value is in container-element position, which the
    /// protocol never permits for booleans.
    fn write_scalar(&mut self, value: &Value, schema: &SchemaNode, path: &str) -> Result<(), CodecError> {
        match (schema, value) {
            (SchemaNode::Bool, _) => Err(CodecError::InvalidBooleanContext),
            (SchemaNode::Byte, Value::Byte(b)) => {
                self.buffer.write_u8(*b as u8);
                Ok(())
            }
            (SchemaNode::I16, Value::I16(n)) => {
                self.write_varint(u64::from(zigzag_encode_16(*n)));
                Ok(())
            }
            (SchemaNode::I32, Value::I32(n)) => {
                self.write_varint(u64::from(zigzag_encode_32(*n)));
                Ok(())
            }
            (SchemaNode::I64, Value::I64(n)) => {
                self.write_varint(zigzag_encode_64(*n));
                Ok(())
            }
            (SchemaNode::Double, Value::Double(d)) => {
                self.buffer.write_bytes(&d.to_le_bytes());
                Ok(())
            }
            (SchemaNode::Float, Value::Float(f)) => {
                self.buffer.write_bytes(&f.to_le_bytes());
                Ok(())
            }
            (SchemaNode::Binary(BinaryKind::Bytes), Value::Binary(bytes)) => {
                self.write_binary(bytes);
                Ok(())
            }
            (SchemaNode::Binary(BinaryKind::String), Value::Str(s)) => {
                self.write_binary(s.as_bytes());
                Ok(())
            }
            (SchemaNode::List(item), Value::List(items)) => {
                self.write_list_header(items.len(), item.type_tag());
                self.enter()?;
                for (i, elem) in items.iter().enumerate() {
                    let elem_path = format!("{path}[{i}]");
                    self.write_container_element(elem, item, &elem_path)?;
                }
                self.exit();
                Ok(())
            }
            (SchemaNode::Set(item), Value::Set(items)) => {
                self.write_list_header(items.len(), item.type_tag());
                self.enter()?;
                for (i, elem) in items.iter().enumerate() {
                    let elem_path = format!("{path}[{i}]");
                    self.write_container_element(elem, item, &elem_path)?;
                }
                self.exit();
                Ok(())
            }
            (SchemaNode::Map { key, value: val_schema }, Value::Map(entries)) => {
                self.write_map_header(entries.len(), key.type_tag(), val_schema.type_tag());
                self.enter()?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    let entry_path = format!("{path}{{{i}}}");
                    self.write_map_key(k, key, &entry_path)?;
                    self.write_container_element(v, val_schema, &entry_path)?;
                }
                self.exit();
                Ok(())
            }
            (SchemaNode::Struct(fields), Value::Struct(values)) => {
                self.write_struct(path, values, fields)
            }
            (_, other) => Err(CodecError::TypeMismatch {
                expected: schema.type_tag(),
                found: other.type_tag(),
                path: path.to_string(),
            }),
        }
    }

    /// A list/set/map element. Booleans are never valid here — the protocol
    /// only ever carries a boolean in a struct field's header nibble — so a
    /// `Bool`-typed item schema always fails, regardless of what `value` is.
    fn write_container_element(&mut self, value: &Value, schema: &SchemaNode, path: &str) -> Result<(), CodecError> {
        if schema.type_tag() == TypeTag::Bool {
            return Err(CodecError::InvalidBooleanContext);
        }
        self.write_scalar(value, schema, path)
    }

    fn write_struct(
        &mut self,
        path: &str,
        values: &IndexMap<String, Value>,
        schema: &StructSchema,
    ) -> Result<(), CodecError> {
        self.enter()?;
        let mut prev = 0i16;
        for (name, descriptor) in schema.iter() {
            let Some(value) = values.get(name) else {
                continue;
            };
            let field_path = format!("{path}.{name}");
            if descriptor.schema.type_tag() == TypeTag::Bool {
                let Value::Bool(b) = value else {
                    return Err(CodecError::TypeMismatch {
                        expected: TypeTag::Bool,
                        found: value.type_tag(),
                        path: field_path,
                    });
                };
                let wire_type = if *b { TypeTag::True } else { TypeTag::False };
                prev = self.write_field_header(prev, descriptor.number, wire_type);
            } else {
                prev = self.write_field_header(prev, descriptor.number, descriptor.schema.type_tag());
                self.write_scalar(value, &descriptor.schema, &field_path)?;
            }
        }
        self.buffer.write_u8(0x00);
        self.exit();
        Ok(())
    }
}
