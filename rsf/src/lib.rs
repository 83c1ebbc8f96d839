//! RSF is a self-describing binary record format.
//!
//! Every object is written as a schema block followed by a data block. Containers carry
//! self-inclusive length prefixes and arrays carry an index of element lengths, so a reader
//! can skip whole containers or seek straight to one array element without decoding what
//! comes before it.
//!
//! ```
//! use rsf::io::BufSource;
//! use rsf::schema::{FieldSpec, Record, RecordValue, Value};
//! use rsf::{Decoder, Encoder, RecordReader};
//!
//! struct Point {
//!     x: i64,
//!     label: String,
//! }
//!
//! impl Record for Point {
//!     fn describe() -> Vec<FieldSpec> {
//!         vec![FieldSpec::int64("x"), FieldSpec::string("label")]
//!     }
//!
//!     fn values(&self) -> RecordValue {
//!         vec![Value::from(self.x), Value::from(self.label.as_str())]
//!     }
//! }
//!
//! let mut encoder = Encoder::new(Vec::new());
//! encoder.write_record(&Point { x: 3, label: "origin".into() })?;
//!
//! let source = BufSource::new(encoder.into_inner())?;
//! let object = RecordReader::new(Decoder::new(source)).read_object()?;
//! assert_eq!(object.values, vec![Value::Int64(3), Value::from("origin")]);
//! # Ok::<(), rsf::error::RsfError>(())
//! ```

pub use rsf_serde::*;
pub use {rsf_error as error, rsf_io as io, rsf_schema as schema};
