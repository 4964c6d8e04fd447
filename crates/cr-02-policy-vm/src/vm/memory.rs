//! # Scratch Memory
//!
//! Byte-addressable, zero-initialised, word-aligned growth, bounded by the
//! configured `max_memory_size`. Memory lives only for one evaluation.

use crate::errors::VmError;

/// Word size in bytes.
pub const WORD_SIZE: usize = 32;

/// Policy scratch memory.
#[derive(Clone, Debug)]
pub struct Memory {
    data: Vec<u8>,
    limit: usize,
}

impl Memory {
    /// Creates empty memory capped at `limit` bytes.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }

    /// Current size in bytes; always a multiple of 32.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Configured size cap in bytes.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns true if nothing has been touched yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size in bytes memory would have after covering `end`.
    ///
    /// # Errors
    ///
    /// Returns `MemoryLimitExceeded` if that size is above the limit.
    pub fn size_after(&self, end: usize) -> Result<usize, VmError> {
        if end <= self.data.len() {
            return Ok(self.data.len());
        }
        let rounded = end
            .checked_next_multiple_of(WORD_SIZE)
            .ok_or(VmError::MemoryLimitExceeded {
                requested: end,
                max: self.limit,
            })?;
        if rounded > self.limit {
            return Err(VmError::MemoryLimitExceeded {
                requested: rounded,
                max: self.limit,
            });
        }
        Ok(rounded)
    }

    /// Grow to cover `end` bytes.
    ///
    /// # Errors
    ///
    /// Returns `MemoryLimitExceeded` if the limit would be crossed.
    pub fn expand(&mut self, end: usize) -> Result<(), VmError> {
        let size = self.size_after(end)?;
        if size > self.data.len() {
            self.data.resize(size, 0);
        }
        Ok(())
    }

    /// Read `size` bytes from `offset`. The region must already be expanded.
    #[must_use]
    pub fn read(&self, offset: usize, size: usize) -> &[u8] {
        if size == 0 {
            return &[];
        }
        &self.data[offset..offset + size]
    }

    /// Read a 32-byte word. The region must already be expanded.
    #[must_use]
    pub fn read_word(&self, offset: usize) -> [u8; 32] {
        let mut word = [0u8; 32];
        word.copy_from_slice(self.read(offset, WORD_SIZE));
        word
    }

    /// Write `bytes` at `offset`. The region must already be expanded.
    pub fn write(&mut self, offset: usize, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Write `size` bytes from `source` starting at `source_offset`,
    /// zero-filling past the end of `source`. The region must already be
    /// expanded.
    pub fn write_padded(&mut self, offset: usize, source: &[u8], source_offset: usize, size: usize) {
        if size == 0 {
            return;
        }
        let target = &mut self.data[offset..offset + size];
        target.fill(0);
        if source_offset < source.len() {
            let available = (source.len() - source_offset).min(size);
            target[..available].copy_from_slice(&source[source_offset..source_offset + available]);
        }
    }

    /// Overlap-safe copy inside memory. Both regions must already be expanded.
    pub fn copy_within(&mut self, dest: usize, src: usize, size: usize) {
        if size == 0 {
            return;
        }
        self.data.copy_within(src..src + size, dest);
    }
}
