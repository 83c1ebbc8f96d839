//! RSF encoding and decoding.
//!
//! An RSF stream is a sequence of objects. Each object is a schema block describing the
//! field layout, followed by a data block holding the record. Every container (record,
//! nested record, array) is prefixed by a self-inclusive 4-byte length so that a reader can
//! skip it wholesale, and every array carries an index section of per-element exclusive
//! lengths so that a reader can jump straight to one element.
//!
//! This crate provides the [`Encoder`], which buffers each container before writing it, and
//! the [`Decoder`], which exposes field-level reads over any [`rsf_io::RsfRead`] while
//! tracking the absolute position. [`RecordReader`] layers schema-guided decoding of whole
//! records on top of the decoder.

pub use decoder::*;
pub use encoder::*;
pub use index::*;
pub use reader::*;

mod decoder;
mod encoder;
mod index;
pub mod primitive;
mod reader;
