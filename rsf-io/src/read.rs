use std::io;
use std::sync::Arc;

use bytes::Bytes;
use rsf_error::{RsfResult, rsf_bail};

/// A stateful, sequential byte source.
///
/// Sources own their cursor. Every successful read or skip advances it by exactly the
/// number of bytes reported, so a caller that sums those counts always knows the
/// absolute offset of the next byte.
pub trait RsfRead {
    /// Fill `buf` from the current position and return the number of bytes read.
    ///
    /// Fewer than `buf.len()` bytes are returned only when the source is exhausted.
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Advance past up to `len` bytes without materializing them, returning the number of
    /// bytes actually skipped.
    fn skip(&mut self, len: u64) -> io::Result<u64>;

    /// Reposition the source so that the next read starts at the absolute offset `pos`.
    ///
    /// Sources without random access keep this default, which always fails with
    /// [`RsfError::Seek`][rsf_error::RsfError::Seek].
    fn seek_to(&mut self, pos: u64) -> RsfResult<()> {
        rsf_bail!(Seek: "source does not support random access (requested offset {pos})")
    }

    /// The total number of readable bytes, if the source knows it.
    fn size(&self) -> Option<u64> {
        None
    }
}

impl<R: RsfRead + ?Sized> RsfRead for &mut R {
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        R::read_into(self, buf)
    }

    fn skip(&mut self, len: u64) -> io::Result<u64> {
        R::skip(self, len)
    }

    fn seek_to(&mut self, pos: u64) -> RsfResult<()> {
        R::seek_to(self, pos)
    }

    fn size(&self) -> Option<u64> {
        R::size(self)
    }
}

impl<R: RsfRead + ?Sized> RsfRead for Box<R> {
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        R::read_into(self, buf)
    }

    fn skip(&mut self, len: u64) -> io::Result<u64> {
        R::skip(self, len)
    }

    fn seek_to(&mut self, pos: u64) -> RsfResult<()> {
        R::seek_to(self, pos)
    }

    fn size(&self) -> Option<u64> {
        R::size(self)
    }
}

/// A trait for types that support positional reads.
///
/// Implementations are stateless: the position is an argument of every read. Wrap one in
/// a [`BufSource`][crate::BufSource] to get a seekable [`RsfRead`].
pub trait RsfReadAt {
    /// Read into `buf` starting at the absolute offset `pos`, returning the number of bytes
    /// read. Fewer than `buf.len()` bytes are returned only at the end of the data.
    fn read_at(&self, pos: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// The number of bytes of data readable.
    ///
    /// For a file it will be the size in bytes.
    fn size(&self) -> io::Result<u64>;

}

impl<T: RsfReadAt + ?Sized> RsfReadAt for Arc<T> {
    fn read_at(&self, pos: u64, buf: &mut [u8]) -> io::Result<usize> {
        T::read_at(self, pos, buf)
    }

    fn size(&self) -> io::Result<u64> {
        T::size(self)
    }
}

impl<T: RsfReadAt + ?Sized> RsfReadAt for &T {
    fn read_at(&self, pos: u64, buf: &mut [u8]) -> io::Result<usize> {
        T::read_at(self, pos, buf)
    }

    fn size(&self) -> io::Result<u64> {
        T::size(self)
    }
}

impl RsfReadAt for [u8] {
    fn read_at(&self, pos: u64, buf: &mut [u8]) -> io::Result<usize> {
        let Ok(start) = usize::try_from(pos) else {
            return Ok(0);
        };
        if start >= self.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.len() - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }
}

impl RsfReadAt for Bytes {
    fn read_at(&self, pos: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.as_ref().read_at(pos, buf)
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }
}

impl RsfReadAt for Vec<u8> {
    fn read_at(&self, pos: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.as_slice().read_at(pos, buf)
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }
}

#[cfg(unix)]
impl RsfReadAt for std::fs::File {
    fn read_at(&self, pos: u64, buf: &mut [u8]) -> io::Result<usize> {
        use std::os::unix::fs::FileExt;

        let mut filled = 0;
        while filled < buf.len() {
            match FileExt::read_at(self, &mut buf[filled..], pos + filled as u64) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn bytes_read_at_clamps_to_end() {
        let data = Bytes::from_static(b"0123456789");
        let mut buf = [0u8; 4];
        assert_eq!(data.read_at(8, &mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"89");
        assert_eq!(data.read_at(10, &mut buf).unwrap(), 0);
        assert_eq!(data.read_at(u64::MAX, &mut buf).unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn file_read_at() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"hello positional world").unwrap();

        let mut buf = [0u8; 10];
        assert_eq!(file.read_at(6, &mut buf).unwrap(), 10);
        assert_eq!(&buf, b"positional");
        assert_eq!(RsfReadAt::size(&file).unwrap(), 22);
    }
}
