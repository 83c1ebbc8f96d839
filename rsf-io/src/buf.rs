use std::io;

use rsf_error::{RsfResult, rsf_bail};

use crate::{RsfRead, RsfReadAt};

/// A stateful reader that wraps an internal [stateless reader][RsfReadAt].
///
/// Read operations advance the cursor. Because every read is positional, seeking is just
/// a cursor update, so this is the source to use for index-guided random access.
#[derive(Debug, Clone)]
pub struct BufSource<R> {
    inner: R,
    pos: u64,
    size: u64,
}

impl<R: RsfReadAt> BufSource<R> {
    /// Create a new source wrapping a stateless reader, with reads beginning at offset 0.
    pub fn new(inner: R) -> io::Result<Self> {
        let size = inner.size()?;
        Ok(Self {
            inner,
            pos: 0,
            size,
        })
    }

    /// The offset of the next read.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Returns a reference to the wrapped reader.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Unwraps this source, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: RsfReadAt> RsfRead for BufSource<R> {
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read_at(self.pos, buf)?;
        self.pos += read as u64;
        Ok(read)
    }

    fn skip(&mut self, len: u64) -> io::Result<u64> {
        let skipped = len.min(self.size.saturating_sub(self.pos));
        self.pos += skipped;
        Ok(skipped)
    }

    fn seek_to(&mut self, pos: u64) -> RsfResult<()> {
        if pos > self.size {
            rsf_bail!(Seek: "offset {pos} is past the end of a {} byte source", self.size);
        }
        self.pos = pos;
        Ok(())
    }

    fn size(&self) -> Option<u64> {
        Some(self.size)
    }
}
