use itertools::Itertools;
use rsf_error::{RsfResult, rsf_bail, rsf_err};
use rsf_io::RsfRead;

use crate::Decoder;
use crate::primitive::SIZE_LEN;

/// One entry of an array's index section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// The element's index key, empty when the array is not indexed.
    pub key: String,
    /// The element's exclusive payload length.
    pub len: u32,
}

/// The index section of an array block, with every payload's absolute offset resolved.
///
/// Reading the index leaves the decoder at the first payload. From there an element can be
/// reached either by [`Decoder::seek_to_element`] on a seekable source or by discarding the
/// payloads in front of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayIndex {
    entries: Vec<IndexEntry>,
    offsets: Vec<u64>,
    end: u64,
}

impl ArrayIndex {
    fn new(entries: Vec<IndexEntry>, data_start: u64) -> Self {
        let offsets = entries
            .iter()
            .scan(data_start, |offset, entry| {
                let start = *offset;
                *offset += u64::from(entry.len);
                Some(start)
            })
            .collect_vec();
        let end = data_start + entries.iter().map(|e| u64::from(e.len)).sum::<u64>();
        Self {
            entries,
            offsets,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn entry(&self, idx: usize) -> Option<&IndexEntry> {
        self.entries.get(idx)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// Position of the first element whose key equals `key`.
    pub fn find(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    /// Binary search for `key`, assuming the keys were written in ascending order.
    ///
    /// Follows [`slice::binary_search`]: `Err` holds the insertion point.
    pub fn binary_search(&self, key: &str) -> Result<usize, usize> {
        self.entries.binary_search_by(|e| e.key.as_str().cmp(key))
    }

    /// Absolute offset of the payload of element `idx`.
    pub fn element_offset(&self, idx: usize) -> Option<u64> {
        self.offsets.get(idx).copied()
    }

    /// Absolute offset just past the last payload, which is also the end of the array block.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Sum of every element's exclusive length.
    pub fn payload_len(&self) -> u64 {
        self.end - self.offsets.first().copied().unwrap_or(self.end)
    }
}

impl<R: RsfRead> Decoder<R> {
    /// Read an array's element count and index section.
    ///
    /// The decoder must be positioned just after the array's length prefix and is left at the
    /// first element payload. `key_width` is zero for arrays without an index key.
    pub fn read_array_index(&mut self, key_width: u32) -> RsfResult<ArrayIndex> {
        let count = self.read_size()?;

        let entry_width = u64::from(key_width) + SIZE_LEN as u64;
        let section = u64::from(count).checked_mul(entry_width).ok_or_else(|| {
            rsf_err!(
                MalformedField: "array index of {} entries of {} bytes overflows",
                count,
                entry_width
            )
        })?;
        if let Some(size) = self.inner().size() {
            if self.position().saturating_add(section) > size {
                rsf_bail!(
                    MalformedField: "array index of {} entries at offset {} overruns the {} byte source",
                    count,
                    self.position(),
                    size
                );
            }
        }
        let capacity = usize::try_from(count)
            .map_err(|_| rsf_err!(LengthOverflow: "array of {} elements", count))?;

        let mut entries = Vec::with_capacity(capacity.min(1 << 16));
        for i in 0..count {
            let entry = self
                .read_index_entry(key_width)
                .map_err(|e| e.with_context(format!("index entry {i} of {count}")))?;
            entries.push(entry);
        }

        Ok(ArrayIndex::new(entries, self.position()))
    }

    fn read_index_entry(&mut self, key_width: u32) -> RsfResult<IndexEntry> {
        let key = if key_width > 0 {
            self.read_fixed_string(key_width)?
        } else {
            String::new()
        };
        Ok(IndexEntry {
            key,
            len: self.read_size()?,
        })
    }

    /// Move to the payload of element `idx`.
    pub fn seek_to_element(&mut self, index: &ArrayIndex, idx: usize) -> RsfResult<()> {
        let offset = index.element_offset(idx).ok_or_else(|| {
            rsf_err!("element {} is out of bounds for an array of {}", idx, index.len())
        })?;
        self.seek(offset)
    }
}
