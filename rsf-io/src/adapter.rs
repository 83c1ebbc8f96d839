use std::io::{self, Read, Seek, SeekFrom, Write};

use rsf_error::{RsfResult, rsf_bail};

use crate::{RsfRead, RsfWrite};

/// Adapts a [`std::io`] reader or writer to the RSF source and sink traits.
///
/// As a source it is strictly sequential: skips are performed by reading and discarding,
/// and [`RsfRead::seek_to`] always fails. Use [`SeekableSource`] when the reader also
/// implements [`Seek`].
pub struct IoAdapter<IO>(pub IO);

fn fill<R: Read + ?Sized>(read: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match read.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl<R: Read> RsfRead for IoAdapter<R> {
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        fill(&mut self.0, buf)
    }

    fn skip(&mut self, len: u64) -> io::Result<u64> {
        io::copy(&mut (&mut self.0).take(len), &mut io::sink())
    }
}

impl<W: Write> RsfWrite for IoAdapter<W> {
    fn write_all(&mut self, buffer: &[u8]) -> io::Result<()> {
        self.0.write_all(buffer)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

/// A random-access source over any `Read + Seek`, such as a [`std::fs::File`] or an
/// [`io::Cursor`].
///
/// Offsets are absolute from the start of the underlying stream. The stream length is
/// measured once at construction so that out-of-range seeks can be rejected up front.
pub struct SeekableSource<R> {
    inner: R,
    pos: u64,
    size: u64,
}

impl<R: Read + Seek> SeekableSource<R> {
    /// Wrap a seekable reader. The reader is rewound so that reads begin at offset 0.
    pub fn new(mut inner: R) -> io::Result<Self> {
        let size = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
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

    /// Unwraps this source, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> RsfRead for SeekableSource<R> {
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = fill(&mut self.inner, buf)?;
        self.pos += read as u64;
        Ok(read)
    }

    fn skip(&mut self, len: u64) -> io::Result<u64> {
        let skipped = len.min(self.size.saturating_sub(self.pos));
        let delta = i64::try_from(skipped)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "skip too large"))?;
        self.inner.seek(SeekFrom::Current(delta))?;
        self.pos += skipped;
        Ok(skipped)
    }

    fn seek_to(&mut self, pos: u64) -> RsfResult<()> {
        if pos > self.size {
            rsf_bail!(Seek: "offset {pos} is past the end of a {} byte source", self.size);
        }
        self.inner.seek(SeekFrom::Start(pos))?;
        log::trace!("seeked source to offset {pos}");
        self.pos = pos;
        Ok(())
    }

    fn size(&self) -> Option<u64> {
        Some(self.size)
    }
}
