//! Release and buddy coalescing.
//!
//! A freed block goes back on the free list, then merges with its neighbors
//! for as long as one of them is its Fibonacci buddy: a free block directly to
//! the right whose order is one less, or a free block directly to the left
//! whose order is one more. Both cases are the inverse of a split. Because the
//! free list is address-ordered and blocks tile the arena, the only candidates
//! are the block's list neighbors.

use tracing::{debug, warn};

use crate::error::HeapError;
use crate::header::{BlockHeader, BlockInfo, Payload};
use crate::heap::FibHeap;
use crate::observer::{HeapEvent, HeapObserver};

impl<O: HeapObserver> FibHeap<O> {
    /// Release an allocation. `None` is a no-op.
    ///
    /// Foreign payloads and double frees are rejected (and logged) without
    /// touching the heap; use [`try_free`](Self::try_free) to observe them.
    pub fn free(&mut self, payload: Option<Payload>) {
        let Some(payload) = payload else {
            return;
        };
        if let Err(err) = self.try_free(payload) {
            warn!(payload = payload.offset(), error = %err, "Free rejected");
        }
    }

    /// Release an allocation, returning the block it ended up in after
    /// coalescing.
    pub fn try_free(&mut self, payload: Payload) -> Result<BlockInfo, HeapError> {
        let invalid = HeapError::InvalidFree {
            payload: payload.offset(),
        };
        let offset = payload
            .offset()
            .checked_sub(self.arena.header_size())
            .ok_or_else(|| invalid.clone())?;
        let header = self.arena.header_mut(offset).ok_or(invalid)?;
        if header.is_free {
            return Err(HeapError::DoubleFree {
                payload: payload.offset(),
            });
        }
        header.mark_free();
        let (size, order) = (header.size, header.order);
        self.free_list.insert(&mut self.arena, offset);

        self.stats.frees += 1;
        debug!(offset, size, order, "Freed");
        self.observer
            .on_event(&HeapEvent::Freed { offset, size, order });

        let merged = self.coalesce(offset);
        self.arena
            .header(merged)
            .map(|header| BlockInfo::from_header(merged, header))
            .ok_or_else(|| HeapError::Corrupted(format!("lost block at {merged}")))
    }

    /// Merge the free block at `offset` with its buddies until none is left.
    /// Returns the offset of the resulting block.
    fn coalesce(&mut self, mut offset: usize) -> usize {
        loop {
            if let Some(right) = self.right_buddy(offset) {
                self.merge(offset, right);
            } else if let Some(left) = self.left_buddy(offset) {
                self.merge(left, offset);
                offset = left;
            } else {
                return offset;
            }
        }
    }

    fn right_buddy(&self, offset: usize) -> Option<usize> {
        let block = self.arena.header(offset)?;
        let right = block.next?;
        let neighbor = self.arena.header(right)?;
        (offset + block.size == right && self.is_buddy_pair(block, neighbor)).then_some(right)
    }

    fn left_buddy(&self, offset: usize) -> Option<usize> {
        let block = self.arena.header(offset)?;
        let left = block.prev?;
        let neighbor = self.arena.header(left)?;
        (left + neighbor.size == offset && self.is_buddy_pair(neighbor, block)).then_some(left)
    }

    /// Whether two address-adjacent blocks (`left` directly before `right`)
    /// can merge: both free, orders `k` and `k-1`, sizes matching the table,
    /// and order `k+1` present in the table.
    pub(crate) fn is_buddy_pair(&self, left: &BlockHeader, right: &BlockHeader) -> bool {
        left.is_free
            && right.is_free
            && left.order == right.order + 1
            && self.table.matches(left.order, left.size)
            && self.table.matches(right.order, right.size)
            && left.order + 1 < self.table.len()
    }

    /// Merge the buddy at `right` into the block at `left`.
    fn merge(&mut self, left: usize, right: usize) {
        let Some(order) = self.arena.header(left).map(|h| h.order + 1) else {
            return;
        };
        let Some(size) = self.table.get(order) else {
            return;
        };

        self.free_list.remove(&mut self.arena, right);
        self.arena.untag(right);
        // The merged block keeps the left address, so its list position holds.
        if let Some(header) = self.arena.header_mut(left) {
            header.order = order;
            header.size = size;
            header.requested_size = 0;
        }

        self.stats.merges += 1;
        debug!(left, right, order, size, "Merged buddies");
        self.observer.on_event(&HeapEvent::Merged {
            left,
            right,
            order,
            size,
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::config::HeapConfig;
    use crate::error::HeapError;
    use crate::header::Payload;
    use crate::heap::FibHeap;
    use crate::observer::{HeapEvent, RecordingObserver};

    fn heap(capacity: usize, header_size: usize) -> FibHeap<RecordingObserver> {
        FibHeap::with_observer(
            HeapConfig::with_capacity(capacity).header_size(header_size),
            RecordingObserver::new(),
        )
        .unwrap()
    }

    #[test]
    fn free_none_is_noop() {
        let mut heap = heap(21, 1);
        heap.observer_mut().take();
        heap.free(None);
        assert!(heap.observer().events().is_empty());
        assert_eq!(heap.stats().frees, 0);
    }

    #[test]
    fn free_merges_left_then_right() {
        let mut heap = heap(21, 1);
        let payload = heap.allocate(4).unwrap();
        heap.observer_mut().take();

        let block = heap.try_free(payload).unwrap();
        assert_eq!((block.offset, block.size, block.order), (0, 21, 6));
        assert_eq!(
            heap.observer().events(),
            &[
                HeapEvent::Freed {
                    offset: 8,
                    size: 5,
                    order: 3
                },
                HeapEvent::Merged {
                    left: 0,
                    right: 8,
                    order: 5,
                    size: 13
                },
                HeapEvent::Merged {
                    left: 0,
                    right: 13,
                    order: 6,
                    size: 21
                },
            ]
        );
        assert_eq!(heap.free_count(), 1);
        heap.check_invariants().unwrap();
    }

    #[test]
    fn free_merges_right_first() {
        let mut heap = heap(21, 1);
        let big = heap.allocate(12).unwrap(); // order 5 at 0, order 4 free at 13
        assert_eq!(big.offset(), 1);
        heap.observer_mut().take();

        heap.free(Some(big));
        assert_eq!(
            heap.observer().events()[1],
            HeapEvent::Merged {
                left: 0,
                right: 13,
                order: 6,
                size: 21
            }
        );
        assert_eq!(heap.free_count(), 1);
    }

    #[test]
    fn equal_orders_never_merge() {
        let mut heap = heap(21, 1);
        let a = heap.allocate(4).unwrap(); // order 3 at 8
        let b = heap.allocate(7).unwrap(); // order 4 at 0
        let c = heap.allocate(7).unwrap(); // order 4 at 13
        assert_eq!((a.offset(), b.offset(), c.offset()), (9, 1, 14));

        heap.free(Some(a));
        heap.free(Some(c));
        // 5-byte block at 8 and 8-byte block at 13: the smaller one is on the
        // left, so they are not buddies.
        let free: Vec<_> = heap.free_blocks().iter().map(|b| (b.offset, b.order)).collect();
        assert_eq!(free, [(8, 3), (13, 4)]);

        heap.free(Some(b));
        assert_eq!(heap.free_count(), 1);
        heap.check_invariants().unwrap();
    }

    #[test]
    fn double_free_is_rejected() {
        let mut heap = heap(21, 1);
        let payload = heap.allocate(4).unwrap();
        heap.free(Some(payload));
        assert_eq!(
            heap.try_free(payload),
            Err(HeapError::DoubleFree { payload: 9 })
        );
        // The public no-return path leaves the heap untouched.
        heap.free(Some(payload));
        assert_eq!(heap.stats().frees, 1);
        heap.check_invariants().unwrap();
    }

    #[test]
    fn foreign_payload_is_rejected() {
        let mut heap = heap(21, 1);
        let _ = heap.allocate(4).unwrap();
        let foreign = heap.allocate(7).unwrap();
        let bogus = Payload::new(foreign.offset() + 2);
        assert_eq!(
            heap.try_free(bogus),
            Err(HeapError::InvalidFree { payload: 3 })
        );
        assert_eq!(
            heap.try_free(Payload::new(0)),
            Err(HeapError::InvalidFree { payload: 0 })
        );
        heap.check_invariants().unwrap();
    }

    #[test]
    fn coalesced_block_has_no_buddy_neighbor() {
        let mut heap = heap(1000, 8);
        let payloads: Vec<_> = [10, 50, 3, 200, 20, 7]
            .iter()
            .map(|&size| heap.allocate(size).unwrap())
            .collect();
        for &payload in payloads.iter().step_by(2) {
            let block = heap.try_free(payload).unwrap();
            let buddies = heap.adjacent_buddies();
            assert!(
                buddies
                    .iter()
                    .all(|&(l, r)| l != block.offset && r != block.offset),
                "block at {} still has a buddy: {buddies:?}",
                block.offset
            );
            heap.check_invariants().unwrap();
        }
    }

    #[test]
    fn order_one_and_zero_merge() {
        let mut heap = heap(3, 0);
        let payload = heap.allocate(1).unwrap();
        let block = heap.try_free(payload).unwrap();
        assert_eq!((block.offset, block.size, block.order), (0, 3, 2));
        assert_eq!(heap.stats().merges, 1);
    }

    #[test]
    fn untouched_buddies_survive_elsewhere() {
        let mut heap = heap(89, 1);
        let a = heap.allocate(19).unwrap();
        let b = heap.allocate(18).unwrap();
        let c = heap.allocate(4).unwrap();
        let d = heap.allocate(2).unwrap();
        assert_eq!(
            (a.offset(), b.offset(), c.offset(), d.offset()),
            (35, 1, 30, 27)
        );
        heap.free(Some(b));
        heap.free(Some(c));
        let e = heap.allocate(9).unwrap();
        assert_eq!(e.offset(), 1);
        let block = heap.try_free(a).unwrap();
        assert_eq!((block.offset, block.order), (34, 6));

        let free: Vec<_> = heap.free_blocks().iter().map(|b| (b.offset, b.order)).collect();
        assert_eq!(free, [(13, 4), (21, 3), (29, 3), (34, 6), (55, 7)]);
        // The split pair at 13/21 was never part of a free, so it stays apart.
        assert_eq!(heap.adjacent_buddies(), [(13, 21)]);
        heap.check_invariants().unwrap();
    }
}
