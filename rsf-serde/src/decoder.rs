use std::fmt::{Display, Formatter};
use std::io;

use rsf_error::{RsfError, RsfResult, rsf_bail, rsf_err};
use rsf_io::RsfRead;
use rsf_schema::Schema;

use crate::primitive::{
    BOOL_LEN, NUMERIC_LEN, SIZE_LEN, bool_from_byte, float64_from_bytes, int64_from_bytes,
    string_from_bytes,
};

/// Limits applied while decoding untrusted input.
#[derive(Debug, Clone, Copy)]
pub struct DecoderOptions {
    /// The largest string or block length accepted before a field is considered malformed.
    pub max_field_len: u32,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_field_len: 256 << 20,
        }
    }
}

/// The location of a container read by [`Decoder::read_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    start: u64,
    len: u32,
}

impl BlockHeader {
    /// Offset of the block's length prefix.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// The self-inclusive length.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Always false: a block contains at least its own prefix.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Offset of the first content byte.
    pub fn content_start(&self) -> u64 {
        self.start + SIZE_LEN as u64
    }

    pub fn content_len(&self) -> u64 {
        u64::from(self.len) - SIZE_LEN as u64
    }

    /// Offset of the first byte after the block.
    pub fn end(&self) -> u64 {
        self.start + u64::from(self.len)
    }
}

impl Display for BlockHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "block {}..{}", self.start, self.end())
    }
}

/// Reads RSF fields from a source while tracking the absolute offset of the next byte.
///
/// The tracked position advances by exactly the number of bytes each read consumes and is
/// only ever reset by [`Decoder::seek`]. After a failed read the position is unspecified
/// and the caller should `seek` before reading again.
pub struct Decoder<R> {
    read: R,
    pos: u64,
    options: DecoderOptions,
}

impl<R: RsfRead> Decoder<R> {
    pub fn new(read: R) -> Self {
        Self {
            read,
            pos: 0,
            options: DecoderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DecoderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> DecoderOptions {
        self.options
    }

    /// The absolute offset of the next byte to be read.
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn inner(&self) -> &R {
        &self.read
    }

    pub fn into_inner(self) -> R {
        self.read
    }

    /// Fill `buf` entirely. `continuing` marks reads that complete a field already begun,
    /// for which running out of input is never a clean end of stream.
    fn fill(&mut self, buf: &mut [u8], what: &str, continuing: bool) -> RsfResult<()> {
        let pos = self.pos;
        let read = self.read.read_into(buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => {
                rsf_err!(Truncated: "source ended while reading {} at offset {}: {}", what, pos, e)
            }
            _ => RsfError::from(e),
        })?;
        self.pos += read as u64;
        if read < buf.len() {
            if read == 0 && !continuing {
                rsf_bail!(EndOfStream: "no bytes remain for {} at offset {}", what, self.pos);
            }
            rsf_bail!(
                Truncated: "{} needs {} bytes but the stream ended after {} at offset {}",
                what,
                buf.len(),
                read,
                self.pos
            );
        }
        Ok(())
    }

    /// Reject a length that runs past the configured limit or a known end of source.
    fn check_span(&self, len: u64, what: &str) -> RsfResult<()> {
        if len > u64::from(self.options.max_field_len) {
            rsf_bail!(
                MalformedField: "{} of {} bytes at offset {} exceeds the limit of {}",
                what,
                len,
                self.pos,
                self.options.max_field_len
            );
        }
        if let Some(size) = self.read.size() {
            if self.pos.saturating_add(len) > size {
                rsf_bail!(
                    MalformedField: "{} of {} bytes at offset {} overruns the {} byte source",
                    what,
                    len,
                    self.pos,
                    size
                );
            }
        }
        Ok(())
    }

    /// Read a 4-byte length or count.
    pub fn read_size(&mut self) -> RsfResult<u32> {
        let mut buf = [0u8; SIZE_LEN];
        self.fill(&mut buf, "length field", false)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Read a length-prefixed string.
    pub fn read_string(&mut self) -> RsfResult<String> {
        let len = self.read_size()?;
        self.check_span(u64::from(len), "string")?;
        let mut bytes = vec![0u8; len as usize];
        self.fill(&mut bytes, "string payload", true)?;
        string_from_bytes(bytes)
    }

    /// Read exactly `width` bytes of text.
    pub fn read_fixed_string(&mut self, width: u32) -> RsfResult<String> {
        self.check_span(u64::from(width), "fixed-width string")?;
        let mut bytes = vec![0u8; width as usize];
        self.fill(&mut bytes, "fixed-width string", false)?;
        string_from_bytes(bytes)
    }

    pub fn read_bool(&mut self) -> RsfResult<bool> {
        let mut buf = [0u8; BOOL_LEN];
        self.fill(&mut buf, "bool", false)?;
        bool_from_byte(buf[0])
    }

    pub fn read_int64(&mut self) -> RsfResult<i64> {
        let mut buf = [0u8; NUMERIC_LEN];
        self.fill(&mut buf, "int64", false)?;
        int64_from_bytes(buf)
    }

    pub fn read_float64(&mut self) -> RsfResult<f64> {
        let mut buf = [0u8; NUMERIC_LEN];
        self.fill(&mut buf, "float64", false)?;
        float64_from_bytes(buf)
    }

    /// Advance past `len` bytes without interpreting them.
    pub fn discard(&mut self, len: u64) -> RsfResult<()> {
        let skipped = self.read.skip(len)?;
        self.pos += skipped;
        if skipped < len {
            if skipped == 0 {
                rsf_bail!(EndOfStream: "cannot discard {} bytes at offset {}", len, self.pos);
            }
            rsf_bail!(
                Truncated: "discarded only {} of {} bytes before offset {}",
                skipped,
                len,
                self.pos
            );
        }
        Ok(())
    }

    /// Move to the absolute offset `pos`; sequential reads continue from there.
    pub fn seek(&mut self, pos: u64) -> RsfResult<()> {
        self.read.seek_to(pos)?;
        log::trace!("decoder moved from offset {} to {}", self.pos, pos);
        self.pos = pos;
        Ok(())
    }

    /// Read a container's self-inclusive length prefix.
    pub fn read_block(&mut self) -> RsfResult<BlockHeader> {
        let start = self.pos;
        let len = self.read_size()?;
        if (len as usize) < SIZE_LEN {
            rsf_bail!(
                MalformedField: "block at offset {} declares length {}, shorter than its own prefix",
                start,
                len
            );
        }
        let header = BlockHeader { start, len };
        self.check_span(header.content_len(), "block")?;
        Ok(header)
    }

    /// Discard whatever remains of `block`.
    pub fn skip_block(&mut self, block: &BlockHeader) -> RsfResult<()> {
        if self.pos > block.end() || self.pos < block.content_start() {
            rsf_bail!("offset {} is outside the content of {}", self.pos, block);
        }
        self.discard(block.end() - self.pos)
    }

    /// Read and parse a schema block.
    pub fn read_schema_block(&mut self) -> RsfResult<Schema> {
        let block = self.read_block()?;
        let len = usize::try_from(block.content_len())
            .map_err(|_| rsf_err!(LengthOverflow: "{} does not fit in memory", block))?;
        let mut content = vec![0u8; len];
        self.fill(&mut content, "schema block", true)?;
        Schema::try_from_block_content(&content)
            .map_err(|e| e.with_context(format!("parsing schema {block}")))
    }

    /// Confirm that everything up to the end of `block` has been consumed.
    pub(crate) fn expect_block_end(&self, block: &BlockHeader) -> RsfResult<()> {
        if self.pos != block.end() {
            rsf_bail!(
                MalformedField: "{} holds {} bytes of content but its fields end at offset {}",
                block,
                block.content_len(),
                self.pos
            );
        }
        Ok(())
    }
}
