#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use bytes::Bytes;
use rsf::error::RsfError;
use rsf::io::{BufSource, IoAdapter, RsfRead};
use rsf::schema::{ArrayKind, FieldDescriptor, FieldKind, RecordValue, Schema, Value};
use rsf::{Decoder, Encoder, RecordReader};
use rstest::rstest;

fn entry_schema() -> Arc<Schema> {
    Arc::new(
        Schema::try_new(vec![
            FieldDescriptor::new("id", FieldKind::FixedString(4)).with_skip(true),
            FieldDescriptor::new("score", FieldKind::Float64),
            FieldDescriptor::new("tags", FieldKind::Array(ArrayKind::try_new(tag_schema(), None).unwrap())),
        ])
        .unwrap(),
    )
}

fn tag_schema() -> Arc<Schema> {
    Arc::new(Schema::try_new(vec![FieldDescriptor::new("tag", FieldKind::String)]).unwrap())
}

fn owner_schema() -> Arc<Schema> {
    Arc::new(
        Schema::try_new(vec![
            FieldDescriptor::new("name", FieldKind::String),
            FieldDescriptor::new("code", FieldKind::FixedString(3)),
            FieldDescriptor::new("active", FieldKind::Bool),
        ])
        .unwrap(),
    )
}

fn root_schema() -> Schema {
    let entries = ArrayKind::try_new(entry_schema(), Some("id".into())).unwrap();
    Schema::try_new(vec![
        FieldDescriptor::new("seq", FieldKind::Int64),
        FieldDescriptor::new("owner", FieldKind::nested(owner_schema()).unwrap()),
        FieldDescriptor::new("entries", FieldKind::Array(entries)),
        FieldDescriptor::new("note", FieldKind::String),
    ])
    .unwrap()
}

fn entry(id: &str, score: f64, tags: &[&str]) -> RecordValue {
    vec![
        Value::fixed(id),
        Value::Float64(score),
        Value::Array(tags.iter().map(|t| vec![Value::from(*t)]).collect()),
    ]
}

fn root_values(entries: Vec<RecordValue>, note: &str) -> RecordValue {
    vec![
        Value::Int64(-42),
        Value::Nested(vec![
            Value::from("ada"),
            Value::fixed("ENG"),
            Value::from(false),
        ]),
        Value::Array(entries),
        Value::from(note),
    ]
}

fn encode(schema: &Schema, values: &[Value]) -> Bytes {
    let mut encoder = Encoder::new(Vec::new());
    let written = encoder.write_values(schema, values).unwrap();
    assert_eq!(u64::try_from(written).unwrap(), encoder.position());
    Bytes::from(encoder.into_inner())
}

#[rstest]
#[case::empty_array(vec![], "")]
#[case::one_entry(vec![entry("a001", 1.5, &["x"])], "single")]
#[case::several_entries(
    vec![
        entry("a001", 0.0, &[]),
        entry("b002", f64::MAX, &["red", "green"]),
        entry("c003", -7.25, &["ünïcödé"]),
    ],
    "several"
)]
fn round_trip(#[case] entries: Vec<RecordValue>, #[case] note: &str) {
    let schema = root_schema();
    let values = root_values(entries, note);
    let bytes = encode(&schema, &values);

    let mut reader = RecordReader::new(Decoder::new(BufSource::new(bytes).unwrap()));
    let object = reader.read_object().unwrap();
    assert_eq!(object.schema, schema);
    assert_eq!(object.values, values);
    assert!(reader.next().is_none());
}

/// Reading a prefix and discarding the rest of the block lands right after it, at every level.
#[test]
fn self_inclusive_lengths() {
    let schema = root_schema();
    let values = root_values(
        vec![entry("a001", 1.0, &["x", "yy"]), entry("b002", 2.0, &["zzz"])],
        "tail",
    );
    let bytes = encode(&schema, &values);
    let mut decoder = Decoder::new(BufSource::new(bytes.clone()).unwrap());

    let schema_block = decoder.read_block().unwrap();
    decoder.discard(schema_block.content_len()).unwrap();
    assert_eq!(decoder.position(), schema_block.end());

    let data = decoder.read_block().unwrap();
    assert_eq!(data.end(), bytes.len() as u64);
    assert_eq!(decoder.read_int64().unwrap(), -42);

    let owner = decoder.read_block().unwrap();
    decoder.discard(owner.content_len()).unwrap();
    assert_eq!(decoder.position(), owner.end());

    let entries = decoder.read_block().unwrap();
    decoder.skip_block(&entries).unwrap();
    assert_eq!(decoder.read_string().unwrap(), "tail");
    assert_eq!(decoder.position(), data.end());
}

/// Element lengths add up to the array content minus its count and index section.
#[test]
fn exclusive_element_lengths() {
    let schema = root_schema();
    let values = root_values(
        vec![
            entry("a001", 1.0, &["x"]),
            entry("b002", 2.0, &[]),
            entry("c003", 3.0, &["p", "q", "r"]),
        ],
        "",
    );
    let bytes = encode(&schema, &values);
    let mut decoder = Decoder::new(BufSource::new(bytes).unwrap());

    decoder.read_schema_block().unwrap();
    decoder.read_block().unwrap();
    decoder.read_int64().unwrap();
    let owner = decoder.read_block().unwrap();
    decoder.skip_block(&owner).unwrap();

    let array = decoder.read_block().unwrap();
    let index = decoder.read_array_index(4).unwrap();
    let entry_width = 4 + 4;
    assert_eq!(
        index.payload_len(),
        array.content_len() - 4 - 3 * entry_width
    );
    assert_eq!(index.keys().collect::<Vec<_>>(), ["a001", "b002", "c003"]);

    // each element is a float plus a nested, unindexed tag array
    for (i, entry) in index.entries().iter().enumerate() {
        decoder.seek_to_element(&index, i).unwrap();
        decoder.read_float64().unwrap();
        let tags = decoder.read_block().unwrap();
        assert_eq!(u64::from(entry.len), 9 + u64::from(tags.len()));
        let tag_index = decoder.read_array_index(0).unwrap();
        assert_eq!(tag_index.end(), tags.end());
    }
}

#[test]
fn schema_block_describes_layout() {
    let schema = root_schema();
    let bytes = encode(&schema, &root_values(vec![], "n"));
    let mut decoder = Decoder::new(IoAdapter(bytes.as_ref()));
    let parsed = decoder.read_schema_block().unwrap();
    assert_eq!(parsed, schema);

    let entries = parsed.field("entries").unwrap().kind().as_array().unwrap();
    assert_eq!(entries.index_name().map(|n| n.as_ref()), Some("id"));
    assert_eq!(entries.key_width(), 4);
    assert!(entries.element().field("id").unwrap().skip());
}

#[test]
fn many_objects_in_one_stream() {
    let schema = root_schema();
    let mut encoder = Encoder::new(Vec::new());
    let mut expected = Vec::new();
    for i in 0..5 {
        let values = root_values(vec![entry("k000", f64::from(i), &[])], &format!("object {i}"));
        encoder.write_values(&schema, &values).unwrap();
        expected.push(values);
    }
    encoder.flush().unwrap();

    let bytes = encoder.into_inner();
    let decoded = RecordReader::new(Decoder::new(IoAdapter(bytes.as_slice())))
        .map(|object| object.map(|o| o.values))
        .collect::<Result<Vec<_>, RsfError>>()
        .unwrap();
    assert_eq!(decoded, expected);
}

#[rstest]
#[case::inside_schema_prefix(|_, _| 2)]
#[case::inside_schema_content(|_, _| 10)]
#[case::before_data_block(|schema_len, _| schema_len)]
#[case::inside_last_string(|_, total| total - 3)]
fn truncation_is_reported(#[case] cut: fn(usize, usize) -> usize) {
    let schema = root_schema();
    let bytes = encode(&schema, &root_values(vec![entry("a001", 1.0, &["x"])], "end"));
    let schema_len = schema.to_block_bytes().unwrap().len();

    let truncated = bytes.slice(..cut(schema_len, bytes.len()));
    let mut reader = RecordReader::new(Decoder::new(IoAdapter(truncated.as_ref())));
    let err = reader.read_object().unwrap_err();
    assert!(err.is_end_of_stream());
    assert!(!err.is_clean_end_of_stream());
}

#[test]
fn sequential_source_rejects_seek() {
    let bytes = encode(&root_schema(), &root_values(vec![], ""));
    let mut decoder = Decoder::new(IoAdapter(bytes.as_ref()));
    assert!(decoder.seek(4).unwrap_err().is_seek());
    assert_eq!(decoder.inner().size(), None);
}

#[test]
fn mismatched_values_are_rejected() {
    let schema = root_schema();
    let mut values = root_values(vec![entry("too long", 1.0, &[])], "");
    let mut encoder = Encoder::new(Vec::new());
    assert!(encoder.write_values(&schema, &values).unwrap_err().is_unsupported_type());

    values[2] = Value::Array(vec![]);
    values[0] = Value::Float64(1.0);
    assert!(encoder.write_values(&schema, &values).unwrap_err().is_unsupported_type());
    assert_eq!(encoder.position(), 0);
    assert!(encoder.into_inner().is_empty());
}
