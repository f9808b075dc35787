//! Shared helpers for the workspace-level integration tests.

use fibheap_core::{BlockInfo, FibHeap, HeapConfig, HeapError, HeapObserver, Payload};

/// Outcome of an allocate-all, free-all run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioRun {
    /// Payload offset per request, `None` where allocation failed.
    pub payloads: Vec<Option<usize>>,
    /// Free list after every request was served.
    pub free_after_alloc: Vec<BlockInfo>,
    /// Free list after every allocation was released.
    pub free_after_free: Vec<BlockInfo>,
}

/// Allocate `sizes` in order, then free the successes in allocation order,
/// or in reverse when `reverse` is set. Invariants are checked after every
/// step.
pub fn run_scenario<O: HeapObserver>(
    heap: &mut FibHeap<O>,
    sizes: &[usize],
    reverse: bool,
) -> Result<ScenarioRun, HeapError> {
    let mut live: Vec<Option<Payload>> = Vec::with_capacity(sizes.len());
    for &size in sizes {
        live.push(heap.allocate(size).ok());
        heap.check_invariants()?;
    }
    let payloads = live.iter().map(|p| p.map(Payload::offset)).collect();
    let free_after_alloc = heap.free_blocks();

    if reverse {
        live.reverse();
    }
    for payload in live.into_iter().flatten() {
        heap.try_free(payload)?;
        heap.check_invariants()?;
    }

    Ok(ScenarioRun {
        payloads,
        free_after_alloc,
        free_after_free: heap.free_blocks(),
    })
}

/// Build a heap with the default observer.
pub fn heap(capacity: usize, header_size: usize) -> Result<FibHeap, HeapError> {
    FibHeap::with_config(HeapConfig::with_capacity(capacity).header_size(header_size))
}

/// `(offset, size, order)` triples of a block listing.
#[must_use]
pub fn triples(blocks: &[BlockInfo]) -> Vec<(usize, usize, usize)> {
    blocks.iter().map(|b| (b.offset, b.size, b.order)).collect()
}
