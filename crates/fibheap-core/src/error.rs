//! Error type for heap initialization, allocation and release.

/// Error type for Fibonacci heap operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeapError {
    /// The arena cannot hold even the smallest block plus its header.
    #[error("capacity {capacity} is too small: at least {required} bytes are needed")]
    CapacityTooSmall {
        /// Requested arena capacity.
        capacity: usize,
        /// Smallest capacity that could carve a block.
        required: usize,
    },

    /// The backing buffer of the arena could not be allocated.
    #[error("failed to allocate a {capacity}-byte arena")]
    ArenaAllocation {
        /// Requested arena capacity.
        capacity: usize,
    },

    /// No Fibonacci order fits inside the arena.
    #[error("no Fibonacci block fits in a {capacity}-byte arena")]
    NoFittingOrder {
        /// Requested arena capacity.
        capacity: usize,
    },

    /// The request (plus header) exceeds the largest order in the table.
    #[error("request of {size} bytes ({total} with header) exceeds the largest block of {largest} bytes")]
    RequestTooLarge {
        /// Payload bytes asked for.
        size: usize,
        /// Payload plus header, saturated on overflow.
        total: usize,
        /// Size of the largest order in the table.
        largest: usize,
    },

    /// No free block is large enough to serve the request right now.
    #[error("allocation of {size} bytes failed: no free block of order {order} or larger")]
    AllocationFailed {
        /// Payload bytes asked for.
        size: usize,
        /// Order the request maps to.
        order: usize,
    },

    /// A block below order 2 was selected for splitting.
    #[error("cannot split block at offset {offset}: order {order} is below 2")]
    SplitUnderflow {
        /// Arena offset of the block.
        offset: usize,
        /// Order of the block.
        order: usize,
    },

    /// The payload does not belong to any block of this heap.
    #[error("payload offset {payload} does not belong to a block of this heap")]
    InvalidFree {
        /// Payload offset passed to free.
        payload: usize,
    },

    /// The payload's block is already free.
    #[error("payload offset {payload} is already free")]
    DoubleFree {
        /// Payload offset passed to free.
        payload: usize,
    },

    /// Heap state violates an invariant.
    #[error("heap corrupted: {0}")]
    Corrupted(String),
}

impl HeapError {
    /// Whether the caller can recover by retrying (with a smaller size or
    /// after freeing memory).
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::RequestTooLarge { .. } | Self::AllocationFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = HeapError::RequestTooLarge {
            size: 100,
            total: 140,
            largest: 89,
        };
        assert_eq!(
            err.to_string(),
            "request of 100 bytes (140 with header) exceeds the largest block of 89 bytes"
        );
        assert_eq!(
            HeapError::Corrupted("gap at 8".into()).to_string(),
            "heap corrupted: gap at 8"
        );
    }

    #[test]
    fn recoverable_kinds() {
        assert!(HeapError::AllocationFailed { size: 1, order: 3 }.is_recoverable());
        assert!(!HeapError::SplitUnderflow { offset: 0, order: 1 }.is_recoverable());
        assert!(!HeapError::NoFittingOrder { capacity: 0 }.is_recoverable());
        assert!(!HeapError::ArenaAllocation { capacity: 1 }.is_recoverable());
    }
}
