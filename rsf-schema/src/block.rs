//! The schema block written ahead of every data record.
//!
//! ```text
//! SchemaBlock := u32(selfInclusiveLen) FieldList
//! FieldList   := u32(fieldCount) FieldEntry{fieldCount}
//! FieldEntry  := u32(nameLen) name u8(tag) Extra
//! Extra       := u32(width) for fixed strings | FieldList for arrays and nested records
//! ```
//!
//! The low nibble of the tag is the [`FieldKind::tag`]. Bit `0x80` marks a skip field and bit
//! `0x40` marks the field its enclosing array is indexed by. All integers are little-endian.

use std::sync::Arc;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use rsf_error::{RsfResult, rsf_bail, rsf_err};

use crate::{ArrayKind, FieldDescriptor, FieldKind, FieldName, Schema};

const SKIP_FLAG: u8 = 0x80;
const INDEX_KEY_FLAG: u8 = 0x40;
const KIND_MASK: u8 = 0x0F;

/// Smallest possible field entry: an empty name and a tag byte.
const MIN_ENTRY_LEN: usize = 5;
/// Deepest array or nested-record nesting a schema block may describe.
pub const MAX_SCHEMA_DEPTH: usize = 64;

impl Schema {
    /// Render the schema block, including its self-inclusive length prefix.
    ///
    /// Fails for schemas nested deeper than [`MAX_SCHEMA_DEPTH`], which could not be read back.
    pub fn to_block_bytes(&self) -> RsfResult<Bytes> {
        let mut content = BytesMut::new();
        write_field_list(self, None, 0, &mut content)?;

        let len = u32::try_from(content.len() + 4)
            .map_err(|_| rsf_err!(LengthOverflow: "schema block of {} bytes", content.len()))?;
        let mut block = BytesMut::with_capacity(content.len() + 4);
        block.put_u32_le(len);
        block.put_slice(&content);
        Ok(block.freeze())
    }

    /// Parse a schema block, including its self-inclusive length prefix.
    pub fn try_from_block_bytes(block: &[u8]) -> RsfResult<Self> {
        let mut buf = block;
        let len = get_u32(&mut buf)?;
        if usize::try_from(len).ok() != Some(block.len()) {
            rsf_bail!(
                MalformedField: "schema block length prefix {} does not match block size {}",
                len,
                block.len()
            );
        }
        Self::try_from_block_content(buf)
    }

    /// Parse the content of a schema block, i.e. everything after its length prefix.
    pub fn try_from_block_content(content: &[u8]) -> RsfResult<Self> {
        let mut buf = content;
        let (schema, index) = read_field_list(&mut buf, 0)?;
        if let Some(name) = index {
            rsf_bail!(MalformedField: "top-level field '{}' is flagged as an index key", name);
        }
        if buf.has_remaining() {
            rsf_bail!(MalformedField: "{} trailing bytes after schema", buf.remaining());
        }
        Ok(schema)
    }
}

fn len_u32(len: usize, what: &str) -> RsfResult<u32> {
    u32::try_from(len).map_err(|_| rsf_err!(LengthOverflow: "{} of {} does not fit in u32", what, len))
}

fn write_field_list(
    schema: &Schema,
    index: Option<usize>,
    depth: usize,
    buf: &mut BytesMut,
) -> RsfResult<()> {
    if depth > MAX_SCHEMA_DEPTH {
        rsf_bail!(Schema: "schema nesting exceeds {} levels", MAX_SCHEMA_DEPTH);
    }
    buf.put_u32_le(len_u32(schema.len(), "field count")?);
    for (position, field) in schema.fields().iter().enumerate() {
        let name = field.name().as_bytes();
        buf.put_u32_le(len_u32(name.len(), "field name")?);
        buf.put_slice(name);

        let mut tag = field.kind().tag();
        if field.skip() {
            tag |= SKIP_FLAG;
        }
        if index == Some(position) {
            tag |= INDEX_KEY_FLAG;
        }
        buf.put_u8(tag);

        match field.kind() {
            FieldKind::FixedString(width) => buf.put_u32_le(*width),
            FieldKind::Array(array) => {
                write_field_list(array.element(), array.index_position(), depth + 1, buf)?
            }
            FieldKind::Nested(nested) => write_field_list(nested, None, depth + 1, buf)?,
            FieldKind::String | FieldKind::Bool | FieldKind::Int64 | FieldKind::Float64 => {}
        }
    }
    Ok(())
}

fn get_u32(buf: &mut &[u8]) -> RsfResult<u32> {
    if buf.remaining() < 4 {
        rsf_bail!(MalformedField: "schema block ends inside a length field");
    }
    Ok(buf.get_u32_le())
}

fn get_u8(buf: &mut &[u8]) -> RsfResult<u8> {
    if !buf.has_remaining() {
        rsf_bail!(MalformedField: "schema block ends inside a field tag");
    }
    Ok(buf.get_u8())
}

/// Returns the schema and the name of the field flagged as its enclosing array's index key.
fn read_field_list(buf: &mut &[u8], depth: usize) -> RsfResult<(Schema, Option<FieldName>)> {
    if depth > MAX_SCHEMA_DEPTH {
        rsf_bail!(MalformedField: "schema nesting exceeds {} levels", MAX_SCHEMA_DEPTH);
    }

    let count = get_u32(buf)? as usize;
    if count > buf.remaining() / MIN_ENTRY_LEN {
        rsf_bail!(
            MalformedField: "schema declares {} fields but only {} bytes remain",
            count,
            buf.remaining()
        );
    }

    let mut fields = Vec::with_capacity(count);
    let mut index = None;
    for _ in 0..count {
        let name_len = get_u32(buf)? as usize;
        if name_len > buf.remaining() {
            rsf_bail!(MalformedField: "field name of {} bytes overruns the schema block", name_len);
        }
        let name = std::str::from_utf8(&buf[..name_len])
            .map_err(|e| rsf_err!(MalformedField: "field name is not UTF-8: {}", e))?;
        let name = FieldName::from(name);
        buf.advance(name_len);

        let tag = get_u8(buf)?;
        let kind = match tag & KIND_MASK {
            FieldKind::STRING_TAG => FieldKind::String,
            FieldKind::FIXED_STRING_TAG => FieldKind::FixedString(get_u32(buf)?),
            FieldKind::BOOL_TAG => FieldKind::Bool,
            FieldKind::INT64_TAG => FieldKind::Int64,
            FieldKind::FLOAT64_TAG => FieldKind::Float64,
            FieldKind::ARRAY_TAG => {
                let (element, key) = read_field_list(buf, depth + 1)?;
                FieldKind::Array(ArrayKind::try_new(Arc::new(element), key)?)
            }
            FieldKind::NESTED_TAG => {
                let (nested, key) = read_field_list(buf, depth + 1)?;
                if let Some(key) = key {
                    rsf_bail!(MalformedField: "nested field '{}' is flagged as an index key", key);
                }
                FieldKind::nested(Arc::new(nested))?
            }
            other => rsf_bail!(MalformedField: "unknown field kind tag {} for '{}'", other, name),
        };

        if tag & INDEX_KEY_FLAG != 0 {
            if let Some(previous) = index.replace(name.clone()) {
                rsf_bail!(
                    MalformedField: "fields '{}' and '{}' are both flagged as the index key",
                    previous,
                    name
                );
            }
        }
        fields.push(FieldDescriptor::new(name, kind).with_skip(tag & SKIP_FLAG != 0));
    }

    Ok((Schema::try_new(fields)?, index))
}
