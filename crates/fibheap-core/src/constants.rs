//! Constants for the Fibonacci size table, heap defaults, and exit codes.

/// Hard cap on the number of orders in a Fibonacci table.
pub const MAX_FIB_COUNT: usize = 50;

/// Size of order 0.
pub const FIB_ORDER0: usize = 1;

/// Size of order 1.
pub const FIB_ORDER1: usize = 2;

/// Default number of bytes reserved in front of every payload.
///
/// Matches a header record of two `usize` sizes, two 32-bit fields and two
/// link words on a 64-bit target.
pub const DEFAULT_HEADER_SIZE: usize = 40;

/// Default arena capacity in bytes.
///
/// 1,836,311,903 is itself a Fibonacci number, so the whole arena is managed.
pub const DEFAULT_CAPACITY: usize = 1_836_311_903;

/// Number of allocations the interactive driver asks for.
pub const DRIVER_ALLOCATIONS: usize = 5;

/// Process exit codes used by the driver.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// An allocation request could not be satisfied.
    pub const ERROR_ALLOCATION: i32 = 2;
    /// Heap state failed an invariant check.
    pub const ERROR_CORRUPTED: i32 = 3;
    /// Invalid configuration (heap could not be initialized).
    pub const ERROR_CONFIG: i32 = 4;
}
