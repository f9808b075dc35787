#![no_main]

use libfuzzer_sys::fuzz_target;

use fibheap_core::{FibHeap, HeapConfig, HeapError, Payload};

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }
    // First two bytes pick the capacity (capped for speed), the third the
    // header size; the rest is a stream of operations.
    let capacity = usize::from(u16::from_le_bytes([data[0], data[1]])) * 16 + 21;
    let header_size = usize::from(data[2] % 48);
    let Ok(mut heap) =
        FibHeap::with_config(HeapConfig::with_capacity(capacity).header_size(header_size))
    else {
        return;
    };
    let managed = heap.managed_size();
    let mut live: Vec<Payload> = Vec::new();

    for chunk in data[3..].chunks(2) {
        let op = chunk[0];
        let arg = usize::from(chunk.get(1).copied().unwrap_or(0));
        if op & 1 == 0 {
            match heap.allocate(arg * usize::from(op >> 1)) {
                Ok(payload) => live.push(payload),
                Err(
                    HeapError::RequestTooLarge { .. }
                    | HeapError::AllocationFailed { .. }
                    | HeapError::SplitUnderflow { .. },
                ) => {}
                Err(other) => panic!("unexpected allocation error: {other}"),
            }
        } else if !live.is_empty() {
            let payload = live.swap_remove(arg % live.len());
            heap.try_free(payload).expect("live payload must free");
            assert!(matches!(
                heap.try_free(payload),
                Err(HeapError::DoubleFree { .. } | HeapError::InvalidFree { .. })
            ));
        }

        heap.check_invariants().expect("heap invariants");
        let total: usize = heap.snapshot().iter().map(|b| b.size).sum();
        assert_eq!(total, managed);
    }
});
