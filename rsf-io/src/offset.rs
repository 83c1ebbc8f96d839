use std::io;

use crate::RsfReadAt;

/// An adapter that offsets all reads by a fixed amount.
///
/// Useful when an RSF stream is embedded inside a larger file: wrapping the file lets the
/// decoder see offsets relative to the start of the stream.
pub struct OffsetReadAt<R> {
    read: R,
    offset: u64,
}

impl<R> Clone for OffsetReadAt<R>
where
    R: Clone,
{
    fn clone(&self) -> Self {
        Self {
            read: self.read.clone(),
            offset: self.offset,
        }
    }
}

impl<R: RsfReadAt> OffsetReadAt<R> {
    pub fn new(read: R, offset: u64) -> Self {
        Self { read, offset }
    }
}

impl<R: RsfReadAt> RsfReadAt for OffsetReadAt<R> {
    fn read_at(&self, pos: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.read.read_at(pos + self.offset, buf)
    }

    fn size(&self) -> io::Result<u64> {
        self.read
            .size()
            .map(|len| len.saturating_sub(self.offset))
    }
}
