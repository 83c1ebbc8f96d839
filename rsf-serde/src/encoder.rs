use bytes::{BufMut, Bytes, BytesMut};
use rsf_error::{RsfError, RsfResult, rsf_bail, rsf_err};
use rsf_io::RsfWrite;
use rsf_schema::{ArrayKind, FieldDescriptor, FieldKind, Record, RecordValue, Schema, Value, resolve};

use crate::primitive::{
    SIZE_LEN, put_block, put_bool, put_fixed_string, put_float64, put_int64, put_size, put_string,
};

/// Limits applied while encoding.
#[derive(Debug, Clone, Copy)]
pub struct EncoderOptions {
    /// The largest self-inclusive block length the encoder will emit.
    pub max_block_len: u32,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            max_block_len: u32::MAX,
        }
    }
}

/// Writes RSF objects to a sink.
///
/// Each call to [`Encoder::write_record`] builds the complete schema block and data block in
/// memory and hands both to the sink in a single write, so a failed encode leaves the sink
/// untouched and [`Encoder::position`] only counts whole objects.
pub struct Encoder<W> {
    write: W,
    pos: u64,
    options: EncoderOptions,
}

impl<W: RsfWrite> Encoder<W> {
    pub fn new(write: W) -> Self {
        Self {
            write,
            pos: 0,
            options: EncoderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EncoderOptions) -> Self {
        self.options = options;
        self
    }

    /// Total bytes handed to the sink so far.
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn inner(&self) -> &W {
        &self.write
    }

    pub fn into_inner(self) -> W {
        self.write
    }

    pub fn flush(&mut self) -> RsfResult<()> {
        Ok(self.write.flush()?)
    }

    /// Write one object for `record`, returning the number of bytes written.
    pub fn write_record<R: Record>(&mut self, record: &R) -> RsfResult<usize> {
        let schema = resolve::<R>()?;
        self.write_values(&schema, &record.values())
    }

    /// Write one object from dynamically shaped values, returning the number of bytes written.
    pub fn write_values(&mut self, schema: &Schema, values: &[Value]) -> RsfResult<usize> {
        schema.validate_root()?;
        let schema_block = schema.to_block_bytes()?;
        if schema_block.len() > self.options.max_block_len as usize {
            rsf_bail!(
                LengthOverflow: "schema block of {} bytes exceeds the limit of {}",
                schema_block.len(),
                self.options.max_block_len
            );
        }
        let data_block = encode_record(schema, values, self.options)?;

        let mut object = BytesMut::with_capacity(schema_block.len() + data_block.len());
        object.put_slice(&schema_block);
        object.put_slice(&data_block);
        self.write.write_all(&object)?;

        let written = object.len();
        log::trace!(
            "wrote object at offset {}: schema block {} bytes, data block {} bytes",
            self.pos,
            schema_block.len(),
            data_block.len()
        );
        self.pos += written as u64;
        Ok(written)
    }
}

/// Encode the data block for `values`, including its self-inclusive length prefix.
pub fn encode_record(schema: &Schema, values: &[Value], options: EncoderOptions) -> RsfResult<Bytes> {
    let encoder = BlockEncoder {
        limit: options.max_block_len,
    };
    let mut content = BytesMut::new();
    encoder.encode_fields(schema, values, &mut content)?;

    let mut block = BytesMut::with_capacity(SIZE_LEN + content.len());
    put_block(&mut block, &content, encoder.limit)?;
    Ok(block.freeze())
}

fn kind_mismatch(field: &FieldDescriptor, value: &Value) -> RsfError {
    rsf_err!(
        UnsupportedType: "field '{}' is declared {} but holds a {} value",
        field.name(),
        field.kind(),
        value.kind_name()
    )
}

struct BlockEncoder {
    limit: u32,
}

impl BlockEncoder {
    fn encode_fields(&self, schema: &Schema, values: &[Value], buf: &mut BytesMut) -> RsfResult<()> {
        if values.len() != schema.len() {
            rsf_bail!(
                UnsupportedType: "schema {} has {} fields but {} values were given",
                schema,
                schema.len(),
                values.len()
            );
        }
        if let Some((field, value)) = schema
            .fields()
            .iter()
            .zip(values)
            .find(|(field, value)| !value.matches(field.kind()))
        {
            return Err(kind_mismatch(field, value));
        }
        for (position, field) in schema.data_fields() {
            self.encode_field(field, &values[position], buf)?;
        }
        Ok(())
    }

    fn encode_field(&self, field: &FieldDescriptor, value: &Value, buf: &mut BytesMut) -> RsfResult<()> {
        let mismatch = || kind_mismatch(field, value);

        match field.kind() {
            FieldKind::String => {
                let text = value.as_str().ok_or_else(mismatch)?;
                put_string(buf, text, self.limit)
            }
            FieldKind::FixedString(width) => {
                let text = value.as_str().ok_or_else(mismatch)?;
                put_fixed_string(buf, text, *width)
                    .map_err(|e| e.with_context(format!("encoding field '{}'", field.name())))
            }
            FieldKind::Bool => {
                put_bool(buf, value.as_bool().ok_or_else(mismatch)?);
                Ok(())
            }
            FieldKind::Int64 => {
                put_int64(buf, value.as_i64().ok_or_else(mismatch)?);
                Ok(())
            }
            FieldKind::Float64 => {
                put_float64(buf, value.as_f64().ok_or_else(mismatch)?);
                Ok(())
            }
            FieldKind::Array(array) => {
                let elements = value.as_array().ok_or_else(mismatch)?;
                self.encode_array(array, elements, buf)
                    .map_err(|e| e.with_context(format!("encoding array '{}'", field.name())))
            }
            FieldKind::Nested(schema) => {
                let fields = value.as_nested().ok_or_else(mismatch)?;
                let mut content = BytesMut::new();
                self.encode_fields(schema, fields, &mut content)?;
                put_block(buf, &content, self.limit)
            }
        }
    }

    /// `[u32 count][index section][payloads]` behind a self-inclusive length.
    fn encode_array(&self, array: &ArrayKind, elements: &[RecordValue], buf: &mut BytesMut) -> RsfResult<()> {
        let mut index = BytesMut::with_capacity(elements.len() * (array.key_width() as usize + SIZE_LEN));
        let mut payloads = BytesMut::new();

        for (i, element) in elements.iter().enumerate() {
            let start = payloads.len();
            self.encode_fields(array.element(), element, &mut payloads)
                .map_err(|e| e.with_context(format!("element {i}")))?;

            if let Some(position) = array.index_position() {
                let key = element
                    .get(position)
                    .and_then(Value::as_str)
                    .ok_or_else(|| rsf_err!(UnsupportedType: "element {} has no text index key", i))?;
                put_fixed_string(&mut index, key, array.key_width())
                    .map_err(|e| e.with_context(format!("index key of element {i}")))?;
            }
            put_size(&mut index, payloads.len() - start, self.limit)?;
        }

        let mut content = BytesMut::with_capacity(SIZE_LEN + index.len() + payloads.len());
        put_size(&mut content, elements.len(), u32::MAX)?;
        content.put_slice(&index);
        content.put_slice(&payloads);
        put_block(buf, &content, self.limit)
    }
}
