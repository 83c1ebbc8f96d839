//! Core traits and implementations for blocking IO.
//!
//! RSF streams are written to anything implementing [`RsfWrite`] and read back from
//! anything implementing [`RsfRead`]. Sources that can read at arbitrary offsets
//! implement [`RsfReadAt`] and gain a cursor via [`BufSource`], which is what makes
//! index-guided seeking possible.

pub use adapter::*;
pub use buf::*;
pub use read::*;
pub use write::*;

mod adapter;
mod buf;
pub mod offset;
mod read;
mod write;
