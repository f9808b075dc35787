//! The heap context.
//!
//! `FibHeap` owns everything an allocator instance needs: the Fibonacci table,
//! the arena with its block headers, and the free list. Allocation and
//! release live in their own modules; this one holds construction and the
//! read-only queries.

use tracing::info;

use crate::arena::Arena;
use crate::config::HeapConfig;
use crate::error::HeapError;
use crate::free_list::FreeList;
use crate::header::{BlockHeader, BlockInfo, Payload};
use crate::observer::{HeapEvent, HeapObserver, NoOpObserver};
use crate::stats::HeapStats;
use crate::table::FibTable;

/// A Fibonacci buddy heap over a fixed arena.
///
/// # Example
/// ```
/// use fibheap_core::{FibHeap, HeapConfig};
///
/// let mut heap = FibHeap::with_config(HeapConfig::with_capacity(21).header_size(1)).unwrap();
/// let payload = heap.allocate(3).unwrap();
/// assert_eq!(payload.offset(), 9);
/// heap.free(Some(payload));
/// assert_eq!(heap.free_blocks().len(), 1);
/// ```
pub struct FibHeap<O: HeapObserver = NoOpObserver> {
    pub(crate) table: FibTable,
    pub(crate) arena: Arena,
    pub(crate) free_list: FreeList,
    pub(crate) managed: usize,
    pub(crate) stats: HeapStats,
    pub(crate) observer: O,
}

impl FibHeap {
    /// Create a heap over `capacity` bytes with the default header size.
    pub fn init(capacity: usize) -> Result<Self, HeapError> {
        Self::with_config(HeapConfig::with_capacity(capacity))
    }

    /// Create a heap from explicit options.
    pub fn with_config(config: HeapConfig) -> Result<Self, HeapError> {
        Self::with_observer(config, NoOpObserver::new())
    }
}

impl<O: HeapObserver> FibHeap<O> {
    /// Create a heap that reports its events to `observer`.
    ///
    /// The arena starts as a single free block of the largest order that fits
    /// in `capacity`; any bytes past it stay unused.
    pub fn with_observer(config: HeapConfig, mut observer: O) -> Result<Self, HeapError> {
        let HeapConfig {
            capacity,
            header_size,
        } = config;
        let table = FibTable::build(capacity, header_size)?;
        let order = table
            .largest_order_within(capacity)
            .ok_or(HeapError::NoFittingOrder { capacity })?;
        let managed = table
            .get(order)
            .ok_or(HeapError::NoFittingOrder { capacity })?;

        let mut arena = Arena::new(capacity, header_size)?;
        let mut free_list = FreeList::new();
        arena.tag(0, BlockHeader::free(order, managed));
        free_list.insert(&mut arena, 0);

        info!(
            capacity,
            header_size,
            managed,
            order,
            orders = table.len(),
            "Heap initialized"
        );
        observer.on_event(&HeapEvent::Initialized {
            capacity,
            offset: 0,
            size: managed,
            order,
        });

        Ok(Self {
            table,
            arena,
            free_list,
            managed,
            stats: HeapStats::default(),
            observer,
        })
    }

    /// The Fibonacci size table.
    #[must_use]
    pub fn table(&self) -> &FibTable {
        &self.table
    }

    /// Bytes reserved in front of every payload.
    #[must_use]
    pub fn header_size(&self) -> usize {
        self.arena.header_size()
    }

    /// Arena capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Bytes under management: the size of the initial block.
    #[must_use]
    pub fn managed_size(&self) -> usize {
        self.managed
    }

    /// Activity counters.
    #[must_use]
    pub fn stats(&self) -> HeapStats {
        self.stats
    }

    /// The observer receiving this heap's events.
    #[must_use]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the observer.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Consume the heap, returning its observer.
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Every block, free or allocated, in address order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<BlockInfo> {
        let mut blocks = Vec::with_capacity(self.arena.block_count());
        let mut offset = 0;
        while offset < self.managed {
            let Some(header) = self.arena.header(offset) else {
                break;
            };
            blocks.push(BlockInfo::from_header(offset, header));
            if header.size == 0 {
                break;
            }
            offset += header.size;
        }
        blocks
    }

    /// Free blocks, in free-list (ascending address) order.
    #[must_use]
    pub fn free_blocks(&self) -> Vec<BlockInfo> {
        self.free_list
            .iter(&self.arena)
            .map(|(offset, header)| BlockInfo::from_header(offset, header))
            .collect()
    }

    /// Number of free blocks.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Header offset of a live allocation, or `None` for a foreign or freed
    /// payload.
    #[must_use]
    pub fn block_of(&self, payload: Payload) -> Option<usize> {
        let offset = payload.offset().checked_sub(self.arena.header_size())?;
        let header = self.arena.header(offset)?;
        (!header.is_free).then_some(offset)
    }

    /// Payload bytes of a live allocation.
    #[must_use]
    pub fn payload(&self, payload: Payload) -> Option<&[u8]> {
        self.arena.payload(self.block_of(payload)?)
    }

    /// Mutable payload bytes of a live allocation.
    pub fn payload_mut(&mut self, payload: Payload) -> Option<&mut [u8]> {
        let offset = self.block_of(payload)?;
        self.arena.payload_mut(offset)
    }

    /// Address-adjacent free pairs that could still merge, as
    /// `(left, right)` offsets.
    ///
    /// Coalescing only looks around the block being freed, so splits made by
    /// earlier allocations can leave such pairs elsewhere in the arena.
    #[must_use]
    pub fn adjacent_buddies(&self) -> Vec<(usize, usize)> {
        let entries: Vec<_> = self.free_list.iter(&self.arena).collect();
        entries
            .windows(2)
            .filter(|pair| {
                let (left, l) = pair[0];
                let (right, r) = pair[1];
                left + l.size == right && self.is_buddy_pair(l, r)
            })
            .map(|pair| (pair[0].0, pair[1].0))
            .collect()
    }

    /// Verify the structural invariants of the heap.
    ///
    /// Checks that blocks tile `[0, managed_size)` without gaps or overlaps,
    /// that every block's size matches its order, that no header is tagged
    /// outside the tiling, and that the free list holds exactly the free
    /// blocks, sorted by address, with consistent back links.
    pub fn check_invariants(&self) -> Result<(), HeapError> {
        let corrupted = |msg: String| Err(HeapError::Corrupted(msg));

        let blocks = self.snapshot();
        let end = blocks.last().map_or(0, BlockInfo::end);
        if end != self.managed {
            return corrupted(format!(
                "blocks cover {end} bytes, expected {}",
                self.managed
            ));
        }
        if blocks.len() != self.arena.block_count() {
            return corrupted(format!(
                "{} headers tagged but {} blocks reachable",
                self.arena.block_count(),
                blocks.len()
            ));
        }
        for block in &blocks {
            if !self.table.matches(block.order, block.size) {
                return corrupted(format!(
                    "block at {} has size {} but order {}",
                    block.offset, block.size, block.order
                ));
            }
            if block.is_free && block.requested_size != 0 {
                return corrupted(format!(
                    "free block at {} keeps a request of {} bytes",
                    block.offset, block.requested_size
                ));
            }
        }

        let free_in_arena = blocks.iter().filter(|b| b.is_free).count();
        let mut listed = 0;
        let mut previous: Option<usize> = None;
        for (offset, header) in self.free_list.iter(&self.arena) {
            if !header.is_free {
                return corrupted(format!("allocated block at {offset} is on the free list"));
            }
            if header.prev != previous {
                return corrupted(format!("broken back link at {offset}"));
            }
            if previous.is_some_and(|p| p >= offset) {
                return corrupted(format!("free list out of order at {offset}"));
            }
            previous = Some(offset);
            listed += 1;
        }
        if listed != free_in_arena || listed != self.free_list.len() {
            return corrupted(format!(
                "free list holds {listed} entries (length {}), arena has {free_in_arena} free blocks",
                self.free_list.len()
            ));
        }
        Ok(())
    }
}
