//! fibheap library: the driver around the Fibonacci buddy heap.

pub mod app;
pub mod config;
pub mod errors;
