//! Heap construction options.

use crate::constants::{DEFAULT_CAPACITY, DEFAULT_HEADER_SIZE};

/// Options for building a [`FibHeap`](crate::heap::FibHeap).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapConfig {
    /// Arena capacity in bytes (0 = default).
    pub capacity: usize,
    /// Bytes reserved in front of every payload.
    pub header_size: usize,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            header_size: DEFAULT_HEADER_SIZE,
        }
    }
}

impl HeapConfig {
    /// Config for `capacity` bytes with the default header size.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Replace the header size.
    #[must_use]
    pub fn header_size(mut self, header_size: usize) -> Self {
        self.header_size = header_size;
        self
    }

    /// Normalize options, applying defaults where values are zero.
    ///
    /// A zero header size is kept: it is a valid (headerless) layout.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.capacity == 0 {
            self.capacity = DEFAULT_CAPACITY;
        }
        self
    }
}
