#![allow(clippy::unwrap_used)]

use std::fs::File;
use std::io::Write;

use bytes::Bytes;
use itertools::Itertools;
use rsf::io::offset::OffsetReadAt;
use rsf::io::{BufSource, IoAdapter, RsfRead, SeekableSource};
use rsf::schema::test_harness::{Company, posit};
use rsf::schema::{Record, Value, resolve};
use rsf::{Decoder, Encoder, RecordReader};

fn encode(company: &Company) -> Vec<u8> {
    let mut encoder = Encoder::new(Vec::new());
    encoder.write_record(company).unwrap();
    encoder.into_inner()
}

/// Walks the stream the way a consumer that only wants the third element would.
fn read_third_element<R: RsfRead>(decoder: &mut Decoder<R>) -> (String, bool) {
    let schema = decoder.read_block().unwrap();
    assert_eq!(schema.len(), 97);
    decoder.skip_block(&schema).unwrap();

    let data = decoder.read_block().unwrap();
    assert_eq!(data.len(), 132);
    assert_eq!(decoder.position(), 101);
    assert_eq!(decoder.read_string().unwrap(), "posit");
    assert_eq!(decoder.position(), 110);
    assert!(decoder.read_bool().unwrap());
    assert_eq!(decoder.position(), 111);

    let array = decoder.read_block().unwrap();
    assert_eq!(array.len(), 100);
    let index = decoder.read_array_index(10).unwrap();
    assert_eq!(decoder.position(), 161);
    assert_eq!(index.entries().iter().map(|e| e.len).collect_vec(), [14, 14, 22]);

    decoder.discard(14 + 14).unwrap();
    assert_eq!(decoder.position(), 189);
    let name = decoder.read_string().unwrap();
    assert_eq!(decoder.position(), 210);
    let verified = decoder.read_bool().unwrap();
    assert_eq!(decoder.position(), 211);

    assert_eq!(decoder.read_int64().unwrap(), 55);
    assert_eq!(decoder.read_float64().unwrap(), 92.689);
    assert_eq!(decoder.position(), data.end());
    assert!(decoder.read_size().unwrap_err().is_clean_end_of_stream());

    (name, verified)
}

#[test]
fn sequential_partial_decode() {
    let bytes = encode(&posit());
    assert_eq!(bytes.len(), 97 + 132);

    let mut decoder = Decoder::new(IoAdapter(bytes.as_slice()));
    let (name, verified) = read_third_element(&mut decoder);
    assert_eq!(name, "this is from 2022");
    assert!(verified);
}

#[test]
fn seek_into_file() {
    let bytes = encode(&posit());
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(&bytes).unwrap();

    let mut sequential = Decoder::new(SeekableSource::new(file.try_clone().unwrap()).unwrap());
    let expected = read_third_element(&mut sequential);

    let mut decoder = Decoder::new(SeekableSource::new(file).unwrap());
    decoder.seek(189).unwrap();
    assert_eq!(decoder.position(), 189);
    assert_eq!(decoder.read_string().unwrap(), expected.0);
    assert_eq!(decoder.read_bool().unwrap(), expected.1);
    assert_eq!(decoder.position(), 211);
}

#[test]
fn seek_with_positional_reads() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&encode(&posit())).unwrap();
    let file = File::open(file.path()).unwrap();

    let mut decoder = Decoder::new(BufSource::new(file).unwrap());
    let index = {
        decoder.seek(115).unwrap();
        decoder.read_array_index(10).unwrap()
    };
    let target = index.binary_search("2022-06-30").unwrap();
    decoder.seek_to_element(&index, target).unwrap();
    assert_eq!(decoder.position(), 189);
    assert_eq!(decoder.read_string().unwrap(), "this is from 2022");
    assert!(decoder.read_bool().unwrap());
}

#[test]
fn full_decode_matches_partial_decode() {
    let bytes = Bytes::from(encode(&posit()));
    let mut reader = RecordReader::new(Decoder::new(BufSource::new(bytes).unwrap()));
    let object = reader.read_object().unwrap();

    assert_eq!(&object.schema, resolve::<Company>().unwrap().as_ref());
    assert_eq!(object.values, posit().values());

    let third = &object.values[2].as_array().unwrap()[2];
    assert_eq!(third[0], Value::fixed("2022-06-30"));
    assert_eq!(third[1], Value::from("this is from 2022"));
    assert_eq!(third[2], Value::from(true));
}

#[test]
fn seek_is_idempotent() {
    let bytes = Bytes::from(encode(&posit()));
    let mut decoder = Decoder::new(BufSource::new(bytes).unwrap());

    decoder.seek(101).unwrap();
    let first = (
        decoder.read_string().unwrap(),
        decoder.read_bool().unwrap(),
        decoder.position(),
    );
    decoder.seek(101).unwrap();
    let second = (
        decoder.read_string().unwrap(),
        decoder.read_bool().unwrap(),
        decoder.position(),
    );
    assert_eq!(first, second);
    assert_eq!(first.2, 111);
}

#[test]
fn stream_embedded_in_file() {
    let header = b"RSFDEMO\0container header";
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(header).unwrap();
    file.write_all(&encode(&posit())).unwrap();
    file.write_all(&encode(&posit())).unwrap();

    let embedded = OffsetReadAt::new(file, header.len() as u64);
    let mut reader = RecordReader::new(Decoder::new(BufSource::new(embedded).unwrap()));
    reader.decoder_mut().seek(97 + 132 + 189).unwrap();
    assert_eq!(reader.decoder_mut().read_string().unwrap(), "this is from 2022");

    reader.decoder_mut().seek(0).unwrap();
    let objects = reader.collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(objects.len(), 2);
    assert!(objects.iter().all(|o| o.values == posit().values()));
}
