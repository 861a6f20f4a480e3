//! Schema-free structural dump: walks raw Compact Protocol bytes using only
//! the wire format itself (field numbers instead of names, no type
//! validation beyond what's needed to know how many bytes to consume) and
//! renders an indented textual tree. Useful for inspecting payloads whose
//! schema is unknown or untrusted.

use std::fmt::Write as _;

use crate::error::CodecError;
use crate::varint::{read_varint_u64, zigzag_decode_16, zigzag_decode_32, zigzag_decode_64};
use crate::wire::TypeTag;

/// Render `bytes` as an indented text tree, assuming the top-level value is
/// a struct (as every Compact Protocol message is).
pub fn dump(bytes: &[u8]) -> Result<String, CodecError> {
    let mut walker = Walker {
        bytes,
        cursor: 0,
        prev_struct_id: 0,
    };
    let mut out = String::new();
    walker.dump_struct(&mut out, 0, None)?;
    Ok(out)
}

struct Walker<'a> {
    bytes: &'a [u8],
    cursor: usize,
    /// Bumped on entry to every nested struct, independent of field numbers —
    /// disambiguates nested frames in the printed output, since field numbers
    /// reset per-struct and can repeat at every depth.
    prev_struct_id: u64,
}

impl Walker<'_> {
    fn read_u8(&mut self) -> Result<u8, CodecError> {
        let byte = *self
            .bytes
            .get(self.cursor)
            .ok_or(CodecError::UnexpectedEof)?;
        self.cursor += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&[u8], CodecError> {
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

    /// `struct_id` is `None` for the top-level struct and `Some` for every
    /// nested one, carrying the value bumped from [`Self::prev_struct_id`] by
    /// the caller — printed in the opening brace so that two sibling or
    /// cousin struct frames at the same field number are still
    /// distinguishable in the dump.
    fn dump_struct(&mut self, out: &mut String, indent: usize, struct_id: Option<u64>) -> Result<(), CodecError> {
        match struct_id {
            Some(id) => writeln!(out, "{{ #{id}").expect("writing to a String never fails"),
            None => writeln!(out, "{{").expect("writing to a String never fails"),
        }
        let mut prev = 0i16;
        while let Some((field_id, wire_type)) = self.read_field_header(&mut prev)? {
            write!(out, "{:indent$}{field_id}: ", "", indent = (indent + 1) * 2)
                .expect("writing to a String never fails");
            match wire_type {
                TypeTag::True => writeln!(out, "true").expect("writing to a String never fails"),
                TypeTag::False => writeln!(out, "false").expect("writing to a String never fails"),
                other => self.dump_value(out, other, indent + 1)?,
            }
        }
        writeln!(out, "{:indent$}}}", "", indent = indent * 2)
            .expect("writing to a String never fails");
        Ok(())
    }

    /// Dumps a single value of `wire_type`, already known from a field or
    /// container header. `True`/`False` field values are handled by the
    /// caller since they carry no trailing bytes; boolean container elements
    /// arrive here as an ordinary byte.
    fn dump_value(&mut self, out: &mut String, wire_type: TypeTag, indent: usize) -> Result<(), CodecError> {
        match wire_type {
            TypeTag::True | TypeTag::False => {
                let b = self.read_u8()? != 0;
                writeln!(out, "{b}").expect("writing to a String never fails");
                Ok(())
            }
            TypeTag::Byte => {
                let b = self.read_u8()? as i8;
                writeln!(out, "{b}").expect("writing to a String never fails");
                Ok(())
            }
            TypeTag::I16 => {
                let n = zigzag_decode_16(self.read_varint()? as u16);
                writeln!(out, "{n}").expect("writing to a String never fails");
                Ok(())
            }
            TypeTag::I32 => {
                let n = zigzag_decode_32(self.read_varint()? as u32);
                writeln!(out, "{n}").expect("writing to a String never fails");
                Ok(())
            }
            TypeTag::I64 => {
                let n = zigzag_decode_64(self.read_varint()?);
                writeln!(out, "{n}").expect("writing to a String never fails");
                Ok(())
            }
            TypeTag::Double => {
                let bytes: [u8; 8] = self.read_bytes(8)?.try_into().expect("exactly 8 bytes");
                writeln!(out, "{}", f64::from_le_bytes(bytes)).expect("writing to a String never fails");
                Ok(())
            }
            TypeTag::Float => {
                let bytes: [u8; 4] = self.read_bytes(4)?.try_into().expect("exactly 4 bytes");
                writeln!(out, "{}", f32::from_le_bytes(bytes)).expect("writing to a String never fails");
                Ok(())
            }
            TypeTag::Binary => {
                let len = self.read_varint()? as usize;
                let bytes = self.read_bytes(len)?;
                match std::str::from_utf8(bytes) {
                    Ok(s) => writeln!(out, "{s:?}").expect("writing to a String never fails"),
                    Err(_) => writeln!(out, "<{len} bytes>").expect("writing to a String never fails"),
                }
                Ok(())
            }
            TypeTag::List | TypeTag::Set => {
                let (size, elem_type) = self.read_list_header()?;
                writeln!(out, "[").expect("writing to a String never fails");
                for _ in 0..size {
                    write!(out, "{:indent$}", "", indent = (indent + 1) * 2)
                        .expect("writing to a String never fails");
                    self.dump_value(out, elem_type, indent + 1)?;
                }
                writeln!(out, "{:indent$}]", "", indent = indent * 2)
                    .expect("writing to a String never fails");
                Ok(())
            }
            TypeTag::Map => {
                let (size, key_type, value_type) = self.read_map_header()?;
                writeln!(out, "{{").expect("writing to a String never fails");
                if let (Some(key_type), Some(value_type)) = (key_type, value_type) {
                    for _ in 0..size {
                        write!(out, "{:indent$}", "", indent = (indent + 1) * 2)
                            .expect("writing to a String never fails");
                        self.dump_value(out, key_type, indent + 1)?;
                        write!(out, "{:indent$}=> ", "", indent = (indent + 1) * 2)
                            .expect("writing to a String never fails");
                        self.dump_value(out, value_type, indent + 1)?;
                    }
                }
                writeln!(out, "{:indent$}}}", "", indent = indent * 2)
                    .expect("writing to a String never fails");
                Ok(())
            }
            TypeTag::Struct => {
                self.prev_struct_id += 1;
                let id = self.prev_struct_id;
                self.dump_struct(out, indent, Some(id))
            }
            TypeTag::Stop | TypeTag::Bool => unreachable!("not a value-bearing wire tag"),
        }
    }
}
