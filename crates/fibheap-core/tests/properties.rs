//! Property-based tests for the Fibonacci heap.
//!
//! These drive random allocate/free sequences through the public API and
//! check the structural invariants after every step.

use proptest::prelude::*;

use fibheap_core::{
    BlockInfo, FibHeap, FibTable, HeapConfig, HeapError, HeapEvent, Payload, RecordingObserver,
    MAX_FIB_COUNT,
};

#[derive(Debug, Clone)]
enum Op {
    Alloc(usize),
    Free(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..600).prop_map(Op::Alloc),
        1 => (0usize..5_000).prop_map(Op::Alloc),
        3 => any::<usize>().prop_map(Op::Free),
    ]
}

fn heap(capacity: usize, header_size: usize) -> FibHeap<RecordingObserver> {
    FibHeap::with_observer(
        HeapConfig::with_capacity(capacity).header_size(header_size),
        RecordingObserver::new(),
    )
    .unwrap()
}

fn total_size(blocks: &[BlockInfo]) -> usize {
    blocks.iter().map(|b| b.size).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The table starts 1, 2, follows the recurrence, and stops at capacity.
    #[test]
    fn table_is_bounded_fibonacci(capacity in 0usize..50_000_000, header in 0usize..64) {
        match FibTable::build(capacity, header) {
            Err(HeapError::CapacityTooSmall { required, .. }) => {
                prop_assert!(capacity < 1 + header);
                prop_assert_eq!(required, 1 + header);
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
            Ok(table) => {
                let sizes = table.as_slice();
                prop_assert_eq!(sizes[0], 1);
                if sizes.len() > 1 {
                    prop_assert_eq!(sizes[1], 2);
                }
                for i in 2..sizes.len() {
                    prop_assert_eq!(sizes[i], sizes[i - 1] + sizes[i - 2]);
                }
                prop_assert!(sizes.windows(2).all(|w| w[0] < w[1]));
                prop_assert!(sizes.iter().all(|&s| s <= capacity));
                prop_assert!(sizes.len() <= MAX_FIB_COUNT);
                if sizes.len() >= 2 {
                    let next = sizes[sizes.len() - 1] + sizes[sizes.len() - 2];
                    prop_assert!(next > capacity);
                }
            }
        }
    }

    /// A fresh heap is one free block of the largest order within capacity.
    #[test]
    fn init_yields_single_largest_block(capacity in 41usize..1_000_000) {
        let heap = FibHeap::init(capacity).unwrap();
        let blocks = heap.snapshot();
        prop_assert_eq!(blocks.len(), 1);
        let order = heap.table().largest_order_within(capacity).unwrap();
        prop_assert_eq!(blocks[0].order, order);
        prop_assert_eq!(blocks[0].size, heap.table().largest());
        prop_assert!(blocks[0].is_free);
        prop_assert!(heap.table().get(order + 1).is_none());
    }

    /// Any interleaving keeps the arena tiled, sorted, and size-conserving,
    /// and every free leaves its coalesced block without a buddy neighbor.
    #[test]
    fn random_sequences_keep_invariants(
        capacity in 21usize..100_000,
        header in prop_oneof![Just(0usize), Just(1), Just(8), Just(16)],
        ops in prop::collection::vec(op_strategy(), 1..80),
    ) {
        let mut heap = heap(capacity, header);
        let managed = heap.managed_size();
        let mut live: Vec<Payload> = Vec::new();

        for op in ops {
            match op {
                Op::Alloc(size) => match heap.allocate(size) {
                    Ok(payload) => {
                        let block = heap.block_of(payload).unwrap();
                        prop_assert_eq!(payload.offset(), block + header);
                        live.push(payload);
                    }
                    Err(err) => prop_assert!(
                        matches!(
                            err,
                            HeapError::RequestTooLarge { .. }
                                | HeapError::AllocationFailed { .. }
                                | HeapError::SplitUnderflow { .. }
                        ),
                        "unexpected error {}", err
                    ),
                },
                Op::Free(pick) if !live.is_empty() => {
                    let payload = live.swap_remove(pick % live.len());
                    let block = heap.try_free(payload).unwrap();
                    prop_assert!(block.is_free);
                    prop_assert!(
                        heap.adjacent_buddies()
                            .iter()
                            .all(|&(l, r)| l != block.offset && r != block.offset)
                    );
                }
                Op::Free(_) => heap.free(None),
            }

            heap.check_invariants().map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(total_size(&heap.snapshot()), managed);
            let free = heap.free_blocks();
            prop_assert!(free.windows(2).all(|w| w[0].offset < w[1].offset));
        }
    }

    /// Allocating and then freeing in reverse order restores the initial block.
    #[test]
    fn reverse_free_restores_initial_block(
        capacity in 21usize..100_000,
        header in 0usize..16,
        sizes in prop::collection::vec(0usize..2_000, 0..40),
    ) {
        let mut heap = heap(capacity, header);
        let initial = heap.snapshot();
        let live: Vec<Payload> = sizes
            .iter()
            .filter_map(|&size| heap.allocate(size).ok())
            .collect();
        for &payload in live.iter().rev() {
            heap.free(Some(payload));
        }
        prop_assert_eq!(heap.snapshot(), initial);
        prop_assert_eq!(heap.stats().splits, heap.stats().merges);
    }

    /// Every split and merge observed obeys fib[k] = fib[k-1] + fib[k-2].
    #[test]
    fn split_and_merge_laws(
        capacity in 21usize..50_000,
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let mut heap = heap(capacity, 4);
        let mut live: Vec<Payload> = Vec::new();
        for op in ops {
            match op {
                Op::Alloc(size) => live.extend(heap.allocate(size).ok()),
                Op::Free(pick) if !live.is_empty() => {
                    let payload = live.swap_remove(pick % live.len());
                    heap.free(Some(payload));
                }
                Op::Free(_) => {}
            }
        }

        let fib = heap.table().as_slice().to_vec();
        for event in heap.observer().events() {
            match *event {
                HeapEvent::Split { offset, order, right_offset } => {
                    prop_assert!(order >= 2);
                    prop_assert_eq!(right_offset, offset + fib[order - 1]);
                    prop_assert_eq!(fib[order - 1] + fib[order - 2], fib[order]);
                }
                HeapEvent::Merged { left, right, order, size } => {
                    prop_assert_eq!(size, fib[order]);
                    prop_assert_eq!(right, left + fib[order - 1]);
                }
                _ => {}
            }
        }
    }
}
