//! Heap usage counters.

use serde::Serialize;

/// Counters for heap activity since initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeapStats {
    /// Successful allocations.
    pub allocations: u64,
    /// Blocks returned through `free`.
    pub frees: u64,
    /// Blocks split while serving allocations.
    pub splits: u64,
    /// Buddy merges performed while coalescing.
    pub merges: u64,
    /// Allocation requests that returned an error.
    pub failed_allocations: u64,
}

impl HeapStats {
    /// Allocations not yet freed.
    #[must_use]
    pub fn live(&self) -> u64 {
        self.allocations.saturating_sub(self.frees)
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
