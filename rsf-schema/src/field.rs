use std::fmt::{Display, Formatter};
use std::sync::Arc;

use rsf_error::{RsfResult, rsf_bail};

use crate::{ArrayKind, FieldKind, Record, Schema, resolve};

/// A name for a field in a record
pub type FieldName = Arc<str>;

/// The resolved layout of one field of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    name: FieldName,
    kind: FieldKind,
    skip: bool,
}

impl FieldDescriptor {
    /// Create a new descriptor that is written to the data section.
    pub fn new<N: Into<FieldName>>(name: N, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            skip: false,
        }
    }

    /// Mark the field as reconstructible from its enclosing array's index.
    pub fn with_skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    /// The wire name of the field
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    /// The wire kind of the field
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether the field is omitted from the data section
    pub fn skip(&self) -> bool {
        self.skip
    }
}

impl Display for FieldDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.skip {
            write!(f, "{}(skip): {}", self.name, self.kind)
        } else {
            write!(f, "{}: {}", self.name, self.kind)
        }
    }
}

type SchemaFn = fn() -> RsfResult<Arc<Schema>>;

#[derive(Clone, Copy)]
enum KindSpec {
    String,
    FixedString(u32),
    Bool,
    Int64,
    Float64,
    Array(SchemaFn),
    Nested(SchemaFn),
}

/// One entry of a record type's static field table, as returned by [`Record::describe`].
///
/// ```
/// use rsf_schema::FieldSpec;
///
/// let date = FieldSpec::fixed_string("date", 10).skip();
/// let name = FieldSpec::string("name");
/// # let _ = (date, name);
/// ```
#[derive(Clone)]
pub struct FieldSpec {
    name: FieldName,
    kind: KindSpec,
    skip: bool,
    index: Option<FieldName>,
}

impl FieldSpec {
    fn new(name: impl Into<FieldName>, kind: KindSpec) -> Self {
        Self {
            name: name.into(),
            kind,
            skip: false,
            index: None,
        }
    }

    /// A length-prefixed string field.
    pub fn string(name: impl Into<FieldName>) -> Self {
        Self::new(name, KindSpec::String)
    }

    /// A fixed-width string field of exactly `width` bytes.
    pub fn fixed_string(name: impl Into<FieldName>, width: u32) -> Self {
        Self::new(name, KindSpec::FixedString(width))
    }

    /// A boolean field.
    pub fn bool(name: impl Into<FieldName>) -> Self {
        Self::new(name, KindSpec::Bool)
    }

    /// A signed 64-bit integer field.
    pub fn int64(name: impl Into<FieldName>) -> Self {
        Self::new(name, KindSpec::Int64)
    }

    /// A 64-bit float field.
    pub fn float64(name: impl Into<FieldName>) -> Self {
        Self::new(name, KindSpec::Float64)
    }

    /// An array of `T` records.
    pub fn array<T: Record>(name: impl Into<FieldName>) -> Self {
        Self::new(name, KindSpec::Array(resolve::<T>))
    }

    /// A nested `T` record.
    pub fn nested<T: Record>(name: impl Into<FieldName>) -> Self {
        Self::new(name, KindSpec::Nested(resolve::<T>))
    }

    /// Omit the field from element payloads; its value is carried by the array index.
    pub fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    /// Index an array field by the named fixed-width field of its element type.
    pub fn index(mut self, key: impl Into<FieldName>) -> Self {
        self.index = Some(key.into());
        self
    }

    /// The wire name of the field
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    /// Turn this entry into a descriptor, resolving element and nested schemas as needed.
    pub(crate) fn into_descriptor(self) -> RsfResult<FieldDescriptor> {
        if self.index.is_some() && !matches!(self.kind, KindSpec::Array(_)) {
            rsf_bail!(Schema: "field '{}' declares an index key but is not an array", self.name);
        }

        let kind = match self.kind {
            KindSpec::String => FieldKind::String,
            KindSpec::FixedString(width) => FieldKind::FixedString(width),
            KindSpec::Bool => FieldKind::Bool,
            KindSpec::Int64 => FieldKind::Int64,
            KindSpec::Float64 => FieldKind::Float64,
            KindSpec::Array(element) => FieldKind::Array(ArrayKind::try_new(element()?, self.index)?),
            KindSpec::Nested(schema) => FieldKind::nested(schema()?)?,
        };

        Ok(FieldDescriptor::new(self.name, kind).with_skip(self.skip))
    }
}
