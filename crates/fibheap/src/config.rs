//! Application configuration from CLI flags and environment.

use clap::{Parser, ValueEnum};

use fibheap_core::HeapConfig;

/// Fibonacci buddy heap simulator.
///
/// Builds a heap, serves a handful of allocation requests, prints the free
/// list, then frees everything and prints it again.
#[derive(Parser, Debug)]
#[command(name = "fibheap", version, about)]
#[allow(clippy::struct_excessive_bools)]
pub struct AppConfig {
    /// Arena capacity in bytes (e.g., "1836311903", "64K", "16M").
    #[arg(
        long,
        default_value = "1836311903",
        env = "FIBHEAP_CAPACITY",
        value_parser = parse_capacity
    )]
    pub capacity: usize,

    /// Bytes reserved in front of every payload.
    #[arg(long, default_value = "40", env = "FIBHEAP_HEADER_SIZE")]
    pub header_size: usize,

    /// Allocation sizes, comma separated. Prompts on stdin when absent.
    #[arg(long, value_delimiter = ',')]
    pub sizes: Option<Vec<usize>>,

    /// Order in which the allocations are released.
    #[arg(long, value_enum, default_value_t = FreeOrder::Fifo)]
    pub free_order: FreeOrder,

    /// Print every split and merge.
    #[arg(short, long)]
    pub trace: bool,

    /// Print heap snapshots as JSON only, without text lines.
    #[arg(long)]
    pub json: bool,

    /// Write the final heap snapshot as JSON to this file.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Verify heap invariants after every operation.
    #[arg(long)]
    pub check: bool,

    /// Quiet mode (no event lines or listings).
    #[arg(short, long)]
    pub quiet: bool,
}

/// Release order for the driver's allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FreeOrder {
    /// Free in allocation order.
    Fifo,
    /// Free in reverse allocation order.
    Lifo,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Whether text lines (table, events, listings, prompts) are printed.
    ///
    /// JSON mode keeps stdout a pure stream of JSON documents.
    #[must_use]
    pub fn text_output(&self) -> bool {
        !self.quiet && !self.json
    }

    /// Heap options derived from the flags.
    #[must_use]
    pub fn heap_config(&self) -> HeapConfig {
        HeapConfig::with_capacity(self.capacity)
            .header_size(self.header_size)
            .normalize()
    }
}

/// Parse a capacity string (e.g., "21", "64K", "16M", "1G").
///
/// Suffixes are binary multiples; a trailing `B` means bytes.
///
/// # Errors
///
/// Returns an error string if the number cannot be parsed or overflows.
pub fn parse_capacity(s: &str) -> Result<usize, String> {
    let s = s.trim();
    let (num_str, multiplier) = if let Some(n) = s.strip_suffix(['G', 'g']) {
        (n, 1usize << 30)
    } else if let Some(n) = s.strip_suffix(['M', 'm']) {
        (n, 1 << 20)
    } else if let Some(n) = s.strip_suffix(['K', 'k']) {
        (n, 1 << 10)
    } else if let Some(n) = s.strip_suffix('B') {
        (n, 1)
    } else {
        (s, 1)
    };

    let value: usize = num_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid capacity: {e}"))?;
    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("capacity {s} does not fit in memory"))
}
