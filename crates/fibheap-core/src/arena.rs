//! Fixed-capacity backing arena.
//!
//! The arena owns the byte buffer every payload is carved from, together with
//! the header tags that mark where blocks start. Block headers are addressed
//! by arena offset; the `header_size` bytes in front of each payload are
//! reserved for them and never handed out.

use std::collections::HashMap;

use crate::error::HeapError;
use crate::header::BlockHeader;

/// Contiguous byte region plus the headers tagged on it.
pub struct Arena {
    bytes: Vec<u8>,
    headers: HashMap<usize, BlockHeader>,
    header_size: usize,
}

impl Arena {
    /// Allocate a zero-filled arena of `capacity` bytes.
    ///
    /// Fails with [`HeapError::ArenaAllocation`] when the buffer cannot be
    /// reserved.
    pub fn new(capacity: usize, header_size: usize) -> Result<Self, HeapError> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(capacity)
            .map_err(|_| HeapError::ArenaAllocation { capacity })?;
        bytes.resize(capacity, 0);
        Ok(Self {
            bytes,
            headers: HashMap::new(),
            header_size,
        })
    }

    /// Arena capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Bytes reserved in front of every payload.
    #[must_use]
    pub fn header_size(&self) -> usize {
        self.header_size
    }

    /// Header of the block starting at `offset`.
    #[must_use]
    pub fn header(&self, offset: usize) -> Option<&BlockHeader> {
        self.headers.get(&offset)
    }

    pub(crate) fn header_mut(&mut self, offset: usize) -> Option<&mut BlockHeader> {
        self.headers.get_mut(&offset)
    }

    /// Tag a block header at `offset`, replacing any previous tag.
    pub(crate) fn tag(&mut self, offset: usize, header: BlockHeader) {
        debug_assert!(offset + header.size <= self.bytes.len());
        self.headers.insert(offset, header);
    }

    /// Remove the header tag at `offset`.
    pub(crate) fn untag(&mut self, offset: usize) -> Option<BlockHeader> {
        self.headers.remove(&offset)
    }

    /// Number of blocks currently tagged.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.headers.len()
    }

    /// Payload bytes of the block whose header is at `offset`.
    #[must_use]
    pub fn payload(&self, offset: usize) -> Option<&[u8]> {
        let header = self.headers.get(&offset)?;
        let start = offset + self.header_size;
        self.bytes.get(start..offset + header.size)
    }

    /// Mutable payload bytes of the block whose header is at `offset`.
    pub fn payload_mut(&mut self, offset: usize) -> Option<&mut [u8]> {
        let header = self.headers.get(&offset)?;
        let start = offset + self.header_size;
        let end = offset + header.size;
        self.bytes.get_mut(start..end)
    }
}
