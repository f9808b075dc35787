//! Allocation: exact-fit lookup, falling back to iterative splitting.
//!
//! A request of `size` bytes needs `size + header_size` bytes, rounded up to
//! the smallest Fibonacci order. If no free block has exactly that order, the
//! first free block (by address) of a larger order is split with
//! `fib[k] = fib[k-1] + fib[k-2]`: the order `k-1` half stays at the block's
//! address and the order `k-2` half follows it. Splitting repeats until a
//! block of the target order appears.

use tracing::debug;

use crate::error::HeapError;
use crate::header::{BlockHeader, Payload};
use crate::heap::FibHeap;
use crate::observer::{HeapEvent, HeapObserver};

impl<O: HeapObserver> FibHeap<O> {
    /// Allocate a block with room for `size` payload bytes.
    ///
    /// The returned payload always starts `header_size` bytes after its block.
    pub fn allocate(&mut self, size: usize) -> Result<Payload, HeapError> {
        match self.allocate_block(size) {
            Ok(offset) => Ok(Payload::new(offset + self.arena.header_size())),
            Err(err) => {
                self.stats.failed_allocations += 1;
                debug!(size, error = %err, "Allocation failed");
                self.observer
                    .on_event(&HeapEvent::AllocationFailed { requested: size });
                Err(err)
            }
        }
    }

    /// Smallest order able to hold `size` payload bytes plus a header.
    pub fn order_for_request(&self, size: usize) -> Result<usize, HeapError> {
        let total = size.checked_add(self.arena.header_size());
        total
            .and_then(|total| self.table.order_for(total))
            .ok_or(HeapError::RequestTooLarge {
                size,
                total: total.unwrap_or(usize::MAX),
                largest: self.table.largest(),
            })
    }

    fn allocate_block(&mut self, size: usize) -> Result<usize, HeapError> {
        let order = self.order_for_request(size)?;
        loop {
            if let Some(offset) = self.free_list.find_exact(&self.arena, order) {
                self.take(offset, size);
                return Ok(offset);
            }
            let offset = self
                .free_list
                .find_larger(&self.arena, order)
                .ok_or(HeapError::AllocationFailed { size, order })?;
            self.split(offset)?;
        }
    }

    /// Move the free block at `offset` to the allocated state.
    fn take(&mut self, offset: usize, size: usize) {
        self.free_list.remove(&mut self.arena, offset);
        let Some(header) = self.arena.header_mut(offset) else {
            return;
        };
        header.mark_allocated(size);
        let (block_size, order) = (header.size, header.order);

        self.stats.allocations += 1;
        debug!(offset, size = block_size, order, requested = size, "Allocated");
        self.observer.on_event(&HeapEvent::Allocated {
            offset,
            payload: offset + self.arena.header_size(),
            size: block_size,
            order,
            requested: size,
        });
    }

    /// Split the free block at `offset` into its order `k-1` and `k-2` halves.
    ///
    /// A block below order 2 cannot be split; it is left on the free list.
    fn split(&mut self, offset: usize) -> Result<(), HeapError> {
        let order = self
            .arena
            .header(offset)
            .map(|header| header.order)
            .ok_or_else(|| HeapError::Corrupted(format!("no free block at {offset}")))?;
        if order < 2 {
            return Err(HeapError::SplitUnderflow { offset, order });
        }
        let (Some(left_size), Some(right_size)) =
            (self.table.get(order - 1), self.table.get(order - 2))
        else {
            return Err(HeapError::Corrupted(format!(
                "order {order} at {offset} is outside the table"
            )));
        };
        let right = offset + left_size;

        self.free_list.remove(&mut self.arena, offset);
        self.arena.tag(offset, BlockHeader::free(order - 1, left_size));
        self.arena.tag(right, BlockHeader::free(order - 2, right_size));
        self.free_list.insert(&mut self.arena, offset);
        self.free_list.insert(&mut self.arena, right);

        self.stats.splits += 1;
        debug!(offset, order, right, "Split block");
        self.observer.on_event(&HeapEvent::Split {
            offset,
            order,
            right_offset: right,
        });
        Ok(())
    }
}
