use rsf_error::{RsfError, RsfResult, rsf_bail};
use rsf_io::RsfRead;
use rsf_schema::{ArrayKind, FieldKind, RecordValue, Schema, Value};

use crate::Decoder;

/// A schema block and the record that followed it.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub schema: Schema,
    pub values: RecordValue,
}

/// Decodes whole records, guided by a schema.
///
/// Fields marked skip are not present in an element's payload. They are rebuilt from the
/// element's key in the array index, so a record read back is equal to the one written.
pub struct RecordReader<R> {
    decoder: Decoder<R>,
}

impl<R: RsfRead> RecordReader<R> {
    pub fn new(decoder: Decoder<R>) -> Self {
        Self { decoder }
    }

    pub fn decoder(&self) -> &Decoder<R> {
        &self.decoder
    }

    /// Access the underlying decoder, e.g. to seek between records.
    pub fn decoder_mut(&mut self) -> &mut Decoder<R> {
        &mut self.decoder
    }

    pub fn into_inner(self) -> Decoder<R> {
        self.decoder
    }

    /// Read a schema block and the data block that follows it.
    pub fn read_object(&mut self) -> RsfResult<Object> {
        let schema = self.decoder.read_schema_block()?;
        let values = self
            .read_record(&schema)
            .map_err(|e| inside_block(e).with_context(format!("decoding record with schema {schema}")))?;
        Ok(Object { schema, values })
    }

    /// Read one data block laid out by `schema`.
    pub fn read_record(&mut self, schema: &Schema) -> RsfResult<RecordValue> {
        let block = self.decoder.read_block()?;
        let values = self.read_fields(schema, None).map_err(inside_block)?;
        self.decoder.expect_block_end(&block)?;
        Ok(values)
    }

    /// `key` carries the index key of the enclosing array element and its field position.
    fn read_fields(&mut self, schema: &Schema, key: Option<(usize, &str)>) -> RsfResult<RecordValue> {
        schema
            .fields()
            .iter()
            .enumerate()
            .map(|(position, field)| {
                if !field.skip() {
                    return self.read_field(field.kind());
                }
                match key {
                    Some((key_position, key)) if key_position == position => {
                        Ok(Value::FixedString(key.to_string()))
                    }
                    _ => rsf_bail!(
                        Schema: "skip field '{}' is not the index key of an enclosing array",
                        field.name()
                    ),
                }
            })
            .collect()
    }

    fn read_field(&mut self, kind: &FieldKind) -> RsfResult<Value> {
        Ok(match kind {
            FieldKind::String => Value::String(self.decoder.read_string()?),
            FieldKind::FixedString(width) => Value::FixedString(self.decoder.read_fixed_string(*width)?),
            FieldKind::Bool => Value::Bool(self.decoder.read_bool()?),
            FieldKind::Int64 => Value::Int64(self.decoder.read_int64()?),
            FieldKind::Float64 => Value::Float64(self.decoder.read_float64()?),
            FieldKind::Array(array) => Value::Array(self.read_array(array)?),
            FieldKind::Nested(schema) => {
                let block = self.decoder.read_block()?;
                let fields = self.read_fields(schema, None)?;
                self.decoder.expect_block_end(&block)?;
                Value::Nested(fields)
            }
        })
    }

    fn read_array(&mut self, array: &ArrayKind) -> RsfResult<Vec<RecordValue>> {
        let block = self.decoder.read_block()?;
        let index = self.decoder.read_array_index(array.key_width())?;
        if index.end() != block.end() {
            rsf_bail!(
                MalformedField: "element lengths end at offset {} but the array {} does",
                index.end(),
                block
            );
        }

        let mut elements = Vec::with_capacity(index.len());
        for (i, entry) in index.entries().iter().enumerate() {
            let start = self.decoder.position();
            let key = array.index_position().map(|position| (position, entry.key.as_str()));
            let element = self.read_fields(array.element(), key)?;
            let len = self.decoder.position() - start;
            if len != u64::from(entry.len) {
                rsf_bail!(
                    MalformedField: "element {} occupies {} bytes but its index entry records {}",
                    i,
                    len,
                    entry.len
                );
            }
            elements.push(element);
        }
        Ok(elements)
    }
}

/// Running out of input inside a data block is never a clean end of stream.
fn inside_block(err: RsfError) -> RsfError {
    match err {
        RsfError::EndOfStream(msg, backtrace) => RsfError::Truncated(msg, backtrace),
        RsfError::Context(msg, inner) => RsfError::Context(msg, Box::new(inside_block(*inner))),
        other => other,
    }
}

impl<R: RsfRead> Iterator for RecordReader<R> {
    type Item = RsfResult<Object>;

    /// Yields objects until the source ends cleanly on an object boundary.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_object() {
            Err(e) if e.is_clean_end_of_stream() => None,
            other => Some(other),
        }
    }
}
