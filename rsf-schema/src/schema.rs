use std::fmt::{Display, Formatter};

use itertools::Itertools;
use rsf_error::{RsfResult, rsf_bail};

use crate::{FieldDescriptor, FieldKind};

/// The resolved, ordered wire layout of one record type.
///
/// Field order is declaration order and is identical for encoding and decoding. Skip fields
/// keep their place in the schema; they are only left out of the data section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    /// Create a schema from an ordered list of descriptors.
    ///
    /// Fails if two fields share a wire name or a fixed-width string has width zero. Array
    /// and nested kinds are validated when they are constructed.
    pub fn try_new(fields: Vec<FieldDescriptor>) -> RsfResult<Self> {
        if let Some(name) = fields.iter().map(|f| f.name()).duplicates().next() {
            rsf_bail!(Schema: "duplicate field name '{}'", name);
        }
        if let Some(field) = fields
            .iter()
            .find(|f| matches!(f.kind(), FieldKind::FixedString(0)))
        {
            rsf_bail!(Schema: "fixed-width string field '{}' has width zero", field.name());
        }
        Ok(Self { fields })
    }

    /// The fields in wire order, including skip fields
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// The number of fields, including skip fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Find the position of a field by name
    /// Returns `None` if the field is not found
    pub fn find_name(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name().as_ref() == name)
    }

    /// Get a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.find_name(name).map(|idx| &self.fields[idx])
    }

    /// The fields written to the data section, with their schema positions, in wire order.
    pub fn data_fields(&self) -> impl Iterator<Item = (usize, &FieldDescriptor)> + '_ {
        self.fields.iter().enumerate().filter(|(_, f)| !f.skip())
    }

    /// Check that this schema can describe a top-level record.
    ///
    /// A top-level record has no enclosing array, so none of its fields may be `skip`.
    pub fn validate_root(&self) -> RsfResult<()> {
        if let Some(field) = self.fields.iter().find(|f| f.skip()) {
            rsf_bail!(
                Schema: "field '{}' is marked skip, but a top-level record has no array index to carry it",
                field.name()
            );
        }
        Ok(())
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.fields.iter().format(", "))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ArrayKind;

    #[test]
    fn rejects_duplicate_names() {
        let err = Schema::try_new(vec![
            FieldDescriptor::new("name", FieldKind::String),
            FieldDescriptor::new("name", FieldKind::Bool),
        ])
        .unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn rejects_zero_width() {
        let err =
            Schema::try_new(vec![FieldDescriptor::new("key", FieldKind::FixedString(0))])
                .unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn data_fields_exclude_skip() {
        let schema = Schema::try_new(vec![
            FieldDescriptor::new("date", FieldKind::FixedString(10)).with_skip(true),
            FieldDescriptor::new("name", FieldKind::String),
            FieldDescriptor::new("verified", FieldKind::Bool),
        ])
        .unwrap();

        let names = schema
            .data_fields()
            .map(|(idx, f)| (idx, f.name().to_string()))
            .collect::<Vec<_>>();
        assert_eq!(names, vec![(1, "name".to_string()), (2, "verified".to_string())]);
        assert!(schema.validate_root().unwrap_err().is_schema());
    }

    #[test]
    fn display() {
        let element = Arc::new(
            Schema::try_new(vec![
                FieldDescriptor::new("key", FieldKind::FixedString(4)),
                FieldDescriptor::new("score", FieldKind::Float64),
            ])
            .unwrap(),
        );
        let schema = Schema::try_new(vec![
            FieldDescriptor::new("id", FieldKind::Int64),
            FieldDescriptor::new(
                "scores",
                FieldKind::Array(ArrayKind::try_new(element, Some("key".into())).unwrap()),
            ),
        ])
        .unwrap();

        assert_eq!(
            schema.to_string(),
            "{id: int64, scores: array<{key: fixed(4), score: float64}> by key}"
        );
        assert_eq!(schema.field("scores").unwrap().kind().tag(), FieldKind::ARRAY_TAG);
        assert!(schema.field("missing").is_none());
    }
}
