//! Address-ordered, intrusive, doubly linked free list.
//!
//! Links live in the block headers themselves (as arena offsets), so the list
//! only stores its head. Entries are kept sorted by ascending offset after
//! every insert: the coalescer relies on this to find a block's address
//! neighbors as its list neighbors.

use crate::arena::Arena;
use crate::header::BlockHeader;

/// Head of the free list plus its length.
#[derive(Debug, Default)]
pub struct FreeList {
    head: Option<usize>,
    len: usize,
}

impl FreeList {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of free blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no block is free.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Offset of the lowest-addressed free block.
    #[must_use]
    pub fn head(&self) -> Option<usize> {
        self.head
    }

    /// Link the block at `offset` in ascending-address position. O(n).
    pub fn insert(&mut self, arena: &mut Arena, offset: usize) {
        let mut prev = None;
        let mut current = self.head;
        while let Some(at) = current {
            if at >= offset {
                break;
            }
            prev = Some(at);
            current = arena.header(at).and_then(|h| h.next);
        }
        debug_assert_ne!(current, Some(offset), "block {offset} is already linked");

        let Some(block) = arena.header_mut(offset) else {
            return;
        };
        block.prev = prev;
        block.next = current;

        match prev.and_then(|p| arena.header_mut(p)) {
            Some(prev) => prev.next = Some(offset),
            None => self.head = Some(offset),
        }
        if let Some(next) = current.and_then(|n| arena.header_mut(n)) {
            next.prev = Some(offset);
        }
        self.len += 1;
    }

    /// Unlink the block at `offset` using its neighbor links. O(1).
    pub fn remove(&mut self, arena: &mut Arena, offset: usize) {
        let Some(block) = arena.header_mut(offset) else {
            return;
        };
        let (prev, next) = (block.prev.take(), block.next.take());

        match prev.and_then(|p| arena.header_mut(p)) {
            Some(prev) => prev.next = next,
            None => self.head = next,
        }
        if let Some(next) = next.and_then(|n| arena.header_mut(n)) {
            next.prev = prev;
        }
        self.len -= 1;
    }

    /// First block, in address order, of exactly `order`.
    #[must_use]
    pub fn find_exact(&self, arena: &Arena, order: usize) -> Option<usize> {
        self.iter(arena)
            .find(|(_, header)| header.order == order)
            .map(|(offset, _)| offset)
    }

    /// First block, in address order, of an order strictly greater than
    /// `order`.
    ///
    /// This is first fit: a larger block at a lower address wins over a
    /// smaller qualifying block further up.
    #[must_use]
    pub fn find_larger(&self, arena: &Arena, order: usize) -> Option<usize> {
        self.iter(arena)
            .find(|(_, header)| header.order > order)
            .map(|(offset, _)| offset)
    }

    /// Walk the list in ascending address order.
    #[must_use]
    pub fn iter<'a>(&self, arena: &'a Arena) -> Iter<'a> {
        Iter {
            arena,
            current: self.head,
        }
    }
}

/// Iterator over `(offset, header)` pairs of a [`FreeList`].
pub struct Iter<'a> {
    arena: &'a Arena,
    current: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a BlockHeader);

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.current?;
        let header = self.arena.header(offset)?;
        self.current = header.next;
        Some((offset, header))
    }
}
