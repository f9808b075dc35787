//! Fibonacci size table.
//!
//! Order `i` of the heap is a block of `fib[i]` bytes, with `fib[0] = 1`,
//! `fib[1] = 2` and `fib[i] = fib[i-1] + fib[i-2]`. The table stops before the
//! first value exceeding the arena capacity, or at [`MAX_FIB_COUNT`] entries.

use crate::constants::{FIB_ORDER0, FIB_ORDER1, MAX_FIB_COUNT};
use crate::error::HeapError;

/// Bounded, strictly increasing table of Fibonacci block sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FibTable {
    sizes: Vec<usize>,
}

impl FibTable {
    /// Build the table for an arena of `capacity` bytes whose blocks carry a
    /// `header_size`-byte header.
    ///
    /// # Example
    /// ```
    /// use fibheap_core::table::FibTable;
    /// let table = FibTable::build(21, 1).unwrap();
    /// assert_eq!(table.as_slice(), &[1, 2, 3, 5, 8, 13, 21]);
    /// ```
    pub fn build(capacity: usize, header_size: usize) -> Result<Self, HeapError> {
        let required = FIB_ORDER0.saturating_add(header_size);
        if capacity < required {
            return Err(HeapError::CapacityTooSmall { capacity, required });
        }

        let mut sizes = Vec::with_capacity(MAX_FIB_COUNT);
        sizes.push(FIB_ORDER0);
        if FIB_ORDER1 <= capacity {
            sizes.push(FIB_ORDER1);
        }
        while sizes.len() >= 2 && sizes.len() < MAX_FIB_COUNT {
            let next = sizes[sizes.len() - 1].checked_add(sizes[sizes.len() - 2]);
            match next {
                Some(next) if next <= capacity => sizes.push(next),
                _ => break,
            }
        }

        Ok(Self { sizes })
    }

    /// Number of orders in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Always false for a built table; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Size in bytes of `order`, if the table has it.
    #[must_use]
    pub fn get(&self, order: usize) -> Option<usize> {
        self.sizes.get(order).copied()
    }

    /// The sizes, indexed by order.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.sizes
    }

    /// Size of the largest order.
    #[must_use]
    pub fn largest(&self) -> usize {
        self.sizes.last().copied().unwrap_or(0)
    }

    /// Smallest order whose size is at least `total` bytes.
    #[must_use]
    pub fn order_for(&self, total: usize) -> Option<usize> {
        let order = self.sizes.partition_point(|&size| size < total);
        (order < self.sizes.len()).then_some(order)
    }

    /// Greatest order whose size is at most `capacity` bytes.
    #[must_use]
    pub fn largest_order_within(&self, capacity: usize) -> Option<usize> {
        self.sizes
            .partition_point(|&size| size <= capacity)
            .checked_sub(1)
    }

    /// Whether a block of `size` bytes is a well-formed block of `order`.
    #[must_use]
    pub fn matches(&self, order: usize, size: usize) -> bool {
        self.get(order) == Some(size)
    }
}
