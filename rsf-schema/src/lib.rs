#![deny(missing_docs)]

//! The schema layer of RSF.
//!
//! A record type describes its fields once through the [`Record`] trait. The resolver turns
//! that description into an immutable, cached [`Schema`] which both the encoder and the
//! decoder follow. This crate also holds the generic [`Value`] model and the codec for the
//! schema block that precedes every serialized record.

pub use block::MAX_SCHEMA_DEPTH;
pub use field::*;
pub use kind::*;
pub use record::*;
pub use resolve::*;
pub use schema::*;
pub use value::*;

mod block;
mod field;
mod kind;
mod record;
mod resolve;
mod schema;
mod value;

#[cfg(any(test, feature = "test-harness"))]
pub mod test_harness;
