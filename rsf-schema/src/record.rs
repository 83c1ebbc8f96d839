use crate::{FieldSpec, RecordValue};

/// A type that can be written as an RSF record.
///
/// The field table returned by [`Record::describe`] is static: it depends only on the type,
/// never on a value, and is resolved once per type by [`resolve`][crate::resolve].
/// [`Record::values`] must return one value per described field, in the same order,
/// including fields marked `skip`.
///
/// ```
/// use rsf_schema::{FieldSpec, Record, RecordValue, Value};
///
/// struct Snapshot {
///     date: String,
///     name: String,
/// }
///
/// impl Record for Snapshot {
///     fn describe() -> Vec<FieldSpec> {
///         vec![
///             FieldSpec::fixed_string("date", 10).skip(),
///             FieldSpec::string("name"),
///         ]
///     }
///
///     fn values(&self) -> RecordValue {
///         vec![Value::fixed(self.date.as_str()), Value::from(self.name.as_str())]
///     }
/// }
/// ```
pub trait Record: 'static {
    /// The ordered field table of this type.
    fn describe() -> Vec<FieldSpec>;

    /// The field values of this record, in the order of [`Record::describe`].
    fn values(&self) -> RecordValue;
}
