//! # fibheap-cli
//!
//! Output for the heap driver: per-event lines, free-list listings, and JSON
//! reports.

pub mod output;
pub mod presenter;

pub use output::HeapReport;
pub use presenter::EventPresenter;
