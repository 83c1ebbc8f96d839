use std::fmt::{Display, Formatter};
use std::sync::Arc;

use rsf_error::{RsfResult, rsf_bail, rsf_err};

use crate::{FieldName, Schema};

/// The wire kind of a field.
///
/// This is a closed set: encoders and decoders select behavior with one exhaustive match,
/// so adding a kind is a compile-checked change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Length-prefixed UTF-8 text
    String,
    /// Exactly `width` bytes of UTF-8 text, with no length prefix
    FixedString(u32),
    /// A single byte, `0` or `1`
    Bool,
    /// A signed 64-bit integer
    Int64,
    /// A 64-bit IEEE-754 float
    Float64,
    /// An indexed array of records
    Array(ArrayKind),
    /// A nested record
    Nested(Arc<Schema>),
}

impl FieldKind {
    /// Tag used for [`FieldKind::String`] in the schema block.
    pub const STRING_TAG: u8 = 0;
    /// Tag used for [`FieldKind::FixedString`] in the schema block.
    pub const FIXED_STRING_TAG: u8 = 1;
    /// Tag used for [`FieldKind::Bool`] in the schema block.
    pub const BOOL_TAG: u8 = 2;
    /// Tag used for [`FieldKind::Int64`] in the schema block and as its wire marker.
    pub const INT64_TAG: u8 = 3;
    /// Tag used for [`FieldKind::Float64`] in the schema block and as its wire marker.
    pub const FLOAT64_TAG: u8 = 4;
    /// Tag used for [`FieldKind::Array`] in the schema block.
    pub const ARRAY_TAG: u8 = 5;
    /// Tag used for [`FieldKind::Nested`] in the schema block.
    pub const NESTED_TAG: u8 = 6;

    /// The kind tag written to the schema block (low nibble of the field's tag byte).
    pub fn tag(&self) -> u8 {
        match self {
            FieldKind::String => Self::STRING_TAG,
            FieldKind::FixedString(_) => Self::FIXED_STRING_TAG,
            FieldKind::Bool => Self::BOOL_TAG,
            FieldKind::Int64 => Self::INT64_TAG,
            FieldKind::Float64 => Self::FLOAT64_TAG,
            FieldKind::Array(_) => Self::ARRAY_TAG,
            FieldKind::Nested(_) => Self::NESTED_TAG,
        }
    }

    /// Get the [`ArrayKind`] if `self` is an array, otherwise `None`
    pub fn as_array(&self) -> Option<&ArrayKind> {
        match self {
            FieldKind::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Get the nested schema if `self` is a nested record, otherwise `None`
    pub fn as_nested(&self) -> Option<&Arc<Schema>> {
        match self {
            FieldKind::Nested(schema) => Some(schema),
            _ => None,
        }
    }

    /// Create a nested-record kind.
    ///
    /// Nested records are not array elements, so none of their fields may be `skip`.
    pub fn nested(schema: Arc<Schema>) -> RsfResult<Self> {
        if let Some(field) = schema.fields().iter().find(|f| f.skip()) {
            rsf_bail!(
                Schema: "field '{}' of a nested record is marked skip, but only array elements can skip fields",
                field.name()
            );
        }
        Ok(FieldKind::Nested(schema))
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::String => write!(f, "string"),
            FieldKind::FixedString(width) => write!(f, "fixed({width})"),
            FieldKind::Bool => write!(f, "bool"),
            FieldKind::Int64 => write!(f, "int64"),
            FieldKind::Float64 => write!(f, "float64"),
            FieldKind::Array(array) => write!(f, "{array}"),
            FieldKind::Nested(schema) => write!(f, "{schema}"),
        }
    }
}

/// The layout of an array field: the element schema and the optional index key.
///
/// The index key names a fixed-width string field of the element type. Its value is written
/// once per element in the array's index section, next to the element's payload length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayKind {
    element: Arc<Schema>,
    index: Option<IndexKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct IndexKey {
    name: FieldName,
    position: usize,
    width: u32,
}

impl ArrayKind {
    /// Create an array kind, validating the index key against the element schema.
    ///
    /// Fails if the key does not exist on the element, is not a fixed-width string, or if
    /// the element has a `skip` field other than the key.
    pub fn try_new(element: Arc<Schema>, index: Option<FieldName>) -> RsfResult<Self> {
        let index = index
            .map(|name| {
                let position = element.find_name(&name).ok_or_else(
                    || rsf_err!(Schema: "array index key '{}' is not a field of the element type", name),
                )?;
                let FieldKind::FixedString(width) = element.fields()[position].kind() else {
                    rsf_bail!(
                        Schema: "array index key '{}' must be a fixed-width string, found {}",
                        name,
                        element.fields()[position].kind()
                    );
                };
                let width = *width;
                Ok(IndexKey {
                    name,
                    position,
                    width,
                })
            })
            .transpose()?;

        for (position, field) in element.fields().iter().enumerate() {
            if field.skip() && index.as_ref().is_none_or(|key| key.position != position) {
                rsf_bail!(
                    Schema: "field '{}' is marked skip, but the enclosing array is not indexed by it",
                    field.name()
                );
            }
        }

        Ok(Self { element, index })
    }

    /// The schema of every element
    pub fn element(&self) -> &Arc<Schema> {
        &self.element
    }

    /// The name of the index key field, if the array is indexed
    pub fn index_name(&self) -> Option<&FieldName> {
        self.index.as_ref().map(|key| &key.name)
    }

    /// The position of the index key within the element schema, if the array is indexed
    pub fn index_position(&self) -> Option<usize> {
        self.index.as_ref().map(|key| key.position)
    }

    /// The byte width of each key in the index section. Zero for an unindexed array.
    pub fn key_width(&self) -> u32 {
        self.index.as_ref().map_or(0, |key| key.width)
    }

    /// The byte width of one index entry: the key plus the 4-byte exclusive length.
    pub fn entry_width(&self) -> u64 {
        u64::from(self.key_width()) + 4
    }
}

impl Display for ArrayKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.index_name() {
            Some(key) => write!(f, "array<{}> by {}", self.element, key),
            None => write!(f, "array<{}>", self.element),
        }
    }
}
