//! Text and JSON formatting of heap state.

use std::fmt::Write as _;
use std::io;
use std::path::Path;

use serde::Serialize;

use fibheap_core::{BlockInfo, FibHeap, FibTable, HeapObserver, HeapStats};

/// Everything the driver reports about a heap at one point in time.
#[derive(Debug, Clone, Serialize)]
pub struct HeapReport {
    /// Arena capacity in bytes.
    pub capacity: usize,
    /// Bytes reserved in front of every payload.
    pub header_size: usize,
    /// Bytes under management.
    pub managed: usize,
    /// Fibonacci sizes by order.
    pub table: Vec<usize>,
    /// All blocks in address order.
    pub blocks: Vec<BlockInfo>,
    /// Free blocks in free-list order.
    pub free: Vec<BlockInfo>,
    /// Activity counters.
    pub stats: HeapStats,
}

impl HeapReport {
    /// Capture the current state of `heap`.
    #[must_use]
    pub fn capture<O: HeapObserver>(heap: &FibHeap<O>) -> Self {
        Self {
            capacity: heap.capacity(),
            header_size: heap.header_size(),
            managed: heap.managed_size(),
            table: heap.table().as_slice().to_vec(),
            blocks: heap.snapshot(),
            free: heap.free_blocks(),
            stats: heap.stats(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Format the Fibonacci table on one line.
#[must_use]
pub fn format_table(table: &FibTable) -> String {
    let mut line = String::from("Fibonacci table:");
    for size in table.as_slice() {
        let _ = write!(line, " {size}");
    }
    line
}

/// Format one block line of a listing.
#[must_use]
pub fn format_block(block: &BlockInfo) -> String {
    let mut line = format!(
        "  Block at {}, size: {} (Fib index: {})",
        block.offset, block.size, block.order
    );
    if !block.is_free {
        let _ = write!(line, ", in use for {} bytes", block.requested_size);
    }
    line
}

/// Format a titled block listing.
#[must_use]
pub fn format_blocks(title: &str, blocks: &[BlockInfo]) -> String {
    let mut out = format!("{title}:");
    if blocks.is_empty() {
        out.push_str("\n  (empty)");
    }
    for block in blocks {
        out.push('\n');
        out.push_str(&format_block(block));
    }
    out
}

/// Format activity counters on one line.
#[must_use]
pub fn format_stats(stats: &HeapStats) -> String {
    format!(
        "Allocations: {}, frees: {}, splits: {}, merges: {}, failed: {}",
        format_number(stats.allocations),
        format_number(stats.frees),
        format_number(stats.splits),
        format_number(stats.merges),
        format_number(stats.failed_allocations),
    )
}

/// Format a number with thousand separators.
#[must_use]
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Write a report to a file as JSON.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be created or written.
pub fn write_report(path: &Path, report: &HeapReport) -> io::Result<()> {
    let content = report.to_json().map_err(io::Error::other)?;
    std::fs::write(path, content)
}
