use std::io;

use bytes::BytesMut;

/// A blocking byte sink.
///
/// The encoder materializes every block before writing it, so sinks never need to seek.
pub trait RsfWrite {
    /// Write the whole buffer, or fail.
    fn write_all(&mut self, buffer: &[u8]) -> io::Result<()>;

    /// Flush any buffered bytes to the underlying transport.
    fn flush(&mut self) -> io::Result<()>;
}

impl RsfWrite for Vec<u8> {
    fn write_all(&mut self, buffer: &[u8]) -> io::Result<()> {
        self.extend_from_slice(buffer);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl RsfWrite for BytesMut {
    fn write_all(&mut self, buffer: &[u8]) -> io::Result<()> {
        self.extend_from_slice(buffer);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: RsfWrite + ?Sized> RsfWrite for &mut W {
    fn write_all(&mut self, buffer: &[u8]) -> io::Result<()> {
        W::write_all(self, buffer)
    }

    fn flush(&mut self) -> io::Result<()> {
        W::flush(self)
    }
}
