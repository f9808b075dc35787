//! # fibheap-core
//!
//! A dynamic-memory allocator simulated over a fixed arena using the
//! Fibonacci buddy system. Block sizes come from the sequence
//! `1, 2, 3, 5, 8, ...`; allocation splits a block of order `k` into orders
//! `k-1` and `k-2`, and release merges such pairs back together.
//!
//! All state lives in a [`FibHeap`]; addresses are arena offsets.
#![warn(missing_docs)]

pub(crate) mod alloc;
pub mod arena;
pub(crate) mod coalesce;
pub mod config;
pub mod constants;
pub mod error;
pub mod free_list;
pub mod header;
pub mod heap;
pub mod observer;
pub mod stats;
pub mod table;

// Re-exports
pub use config::HeapConfig;
pub use constants::{exit_codes, DEFAULT_CAPACITY, DEFAULT_HEADER_SIZE, MAX_FIB_COUNT};
pub use error::HeapError;
pub use header::{BlockInfo, Payload};
pub use heap::FibHeap;
pub use observer::{HeapEvent, HeapObserver, LoggingObserver, NoOpObserver, RecordingObserver};
pub use stats::HeapStats;
pub use table::FibTable;
