use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::{FieldKind, Record};

/// The values of one record, in schema order. Skip fields are included.
pub type RecordValue = Vec<Value>;

/// A single field value.
///
/// This is the generic representation shared by the encoder and the record reader. Each
/// variant corresponds to one [`FieldKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A length-prefixed string
    String(String),
    /// A fixed-width string
    FixedString(String),
    /// A boolean
    Bool(bool),
    /// A signed 64-bit integer
    Int64(i64),
    /// A 64-bit float
    Float64(f64),
    /// The elements of an array field
    Array(Vec<RecordValue>),
    /// A nested record
    Nested(RecordValue),
}

impl Value {
    /// Wrap a string as a fixed-width value.
    pub fn fixed(value: impl Into<String>) -> Self {
        Value::FixedString(value.into())
    }

    /// Build an array value from a slice of records.
    pub fn array<T: Record>(items: &[T]) -> Self {
        Value::Array(items.iter().map(Record::values).collect())
    }

    /// Build a nested value from a record.
    pub fn nested<T: Record>(item: &T) -> Self {
        Value::Nested(item.values())
    }

    /// A short name for the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::FixedString(_) => "fixed string",
            Value::Bool(_) => "bool",
            Value::Int64(_) => "int64",
            Value::Float64(_) => "float64",
            Value::Array(_) => "array",
            Value::Nested(_) => "nested record",
        }
    }

    /// Whether this value can be written as a field of the given kind.
    ///
    /// Both string variants are accepted for both string kinds; fixed-width strings are
    /// additionally checked for their exact byte width when encoded.
    pub fn matches(&self, kind: &FieldKind) -> bool {
        matches!(
            (self, kind),
            (
                Value::String(_) | Value::FixedString(_),
                FieldKind::String | FieldKind::FixedString(_)
            ) | (Value::Bool(_), FieldKind::Bool)
                | (Value::Int64(_), FieldKind::Int64)
                | (Value::Float64(_), FieldKind::Float64)
                | (Value::Array(_), FieldKind::Array(_))
                | (Value::Nested(_), FieldKind::Nested(_))
        )
    }

    /// Get the text if `self` is either string variant
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::FixedString(s) => Some(s),
            _ => None,
        }
    }

    /// Get the boolean if `self` is a [`Value::Bool`]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the integer if `self` is a [`Value::Int64`]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the float if `self` is a [`Value::Float64`]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the elements if `self` is a [`Value::Array`]
    pub fn as_array(&self) -> Option<&[RecordValue]> {
        match self {
            Value::Array(elements) => Some(elements),
            _ => None,
        }
    }

    /// Get the fields if `self` is a [`Value::Nested`]
    pub fn as_nested(&self) -> Option<&[Value]> {
        match self {
            Value::Nested(fields) => Some(fields),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) | Value::FixedString(s) => write!(f, "\"{}\"", s.escape_default()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Array(elements) => write!(
                f,
                "[{}]",
                elements
                    .iter()
                    .map(|fields| format!("{{{}}}", fields.iter().format(", ")))
                    .format(", ")
            ),
            Value::Nested(fields) => write!(f, "{{{}}}", fields.iter().format(", ")),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float64(value)
    }
}
