//! Block metadata and the handles exposed to callers.

use serde::Serialize;

/// Metadata tagged on the first byte of every block, free or allocated.
///
/// `prev`/`next` are the intrusive free-list links, as arena offsets. They are
/// only meaningful while the block is on the free list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Total block size in bytes, header included. Always `fib[order]`.
    pub size: usize,
    /// Payload bytes asked for; 0 while the block is free.
    pub requested_size: usize,
    /// Index into the Fibonacci table.
    pub order: usize,
    /// Whether the block is on the free list.
    pub is_free: bool,
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
}

impl BlockHeader {
    /// A free, unlinked header of `order` spanning `size` bytes.
    #[must_use]
    pub fn free(order: usize, size: usize) -> Self {
        Self {
            size,
            requested_size: 0,
            order,
            is_free: true,
            prev: None,
            next: None,
        }
    }

    /// Reset to a free, unlinked state.
    pub(crate) fn mark_free(&mut self) {
        self.is_free = true;
        self.requested_size = 0;
        self.prev = None;
        self.next = None;
    }

    /// Mark allocated for a request of `requested_size` payload bytes.
    pub(crate) fn mark_allocated(&mut self, requested_size: usize) {
        self.is_free = false;
        self.requested_size = requested_size;
        self.prev = None;
        self.next = None;
    }
}

/// Handle to an allocation: the arena offset of its payload.
///
/// The block header always sits exactly `header_size` bytes before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Payload(usize);

impl Payload {
    pub(crate) fn new(offset: usize) -> Self {
        Self(offset)
    }

    /// Arena offset of the first payload byte.
    #[must_use]
    pub fn offset(self) -> usize {
        self.0
    }
}

/// Read-only view of one block, as reported by snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockInfo {
    /// Arena offset of the block header.
    pub offset: usize,
    /// Total size in bytes, header included.
    pub size: usize,
    /// Fibonacci order.
    pub order: usize,
    /// Whether the block is free.
    pub is_free: bool,
    /// Payload bytes asked for (0 when free).
    pub requested_size: usize,
}

impl BlockInfo {
    pub(crate) fn from_header(offset: usize, header: &BlockHeader) -> Self {
        Self {
            offset,
            size: header.size,
            order: header.order,
            is_free: header.is_free,
            requested_size: header.requested_size,
        }
    }

    /// Offset one past the last byte of the block.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.size
    }
}
