//! Application entry point: the allocate, list, free, list scenario.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use fibheap_cli::output::{format_blocks, format_stats, format_table, write_report};
use fibheap_cli::{EventPresenter, HeapReport};
use fibheap_core::constants::DRIVER_ALLOCATIONS;
use fibheap_core::{FibHeap, FibTable, Payload};

use crate::config::{AppConfig, FreeOrder};
use crate::errors::DriverError;

type DriverHeap<W> = FibHeap<EventPresenter<W>>;

/// Run the application against stdin and stdout.
pub fn run(config: &AppConfig) -> Result<()> {
    let stdin = io::stdin();
    run_with(config, stdin.lock(), io::stdout().lock())?;
    Ok(())
}

/// Run the application with explicit input and output, returning the
/// output writer.
pub fn run_with<R: BufRead, W: Write>(config: &AppConfig, mut input: R, mut out: W) -> Result<W> {
    let heap_config = config.heap_config();
    if config.text_output() {
        let table = FibTable::build(heap_config.capacity, heap_config.header_size)?;
        writeln!(out, "{}", format_table(&table))?;
    }

    let presenter = EventPresenter::new(out, config.trace, !config.text_output());
    let mut heap = FibHeap::with_observer(heap_config, presenter)?;
    check(&heap, config)?;

    let count = config.sizes.as_ref().map_or(DRIVER_ALLOCATIONS, Vec::len);
    debug!(count, "Serving allocations");
    let mut live: Vec<Option<Payload>> = Vec::with_capacity(count);
    for index in 0..count {
        let size = match &config.sizes {
            Some(sizes) => sizes[index],
            None => prompt_size(&mut heap, &mut input, index, !config.text_output())?,
        };
        live.push(allocate(&mut heap, size, config)?);
        check(&heap, config)?;
    }

    show(&mut heap, "Free list", config)?;

    if config.text_output() {
        writeln!(heap.observer_mut().writer_mut(), "\nFreeing all allocations...")?;
    }
    if config.free_order == FreeOrder::Lifo {
        live.reverse();
    }
    for payload in live.into_iter().flatten() {
        heap.free(Some(payload));
        if config.text_output() {
            writeln!(
                heap.observer_mut().writer_mut(),
                "Freed memory at: {}",
                payload.offset()
            )?;
        }
        check(&heap, config)?;
    }

    show(&mut heap, "Free list after freeing", config)?;
    if config.text_output() {
        let stats = format_stats(&heap.stats());
        writeln!(heap.observer_mut().writer_mut(), "{stats}")?;
    }

    if let Some(path) = &config.output {
        write_report(Path::new(path), &HeapReport::capture(&heap))
            .with_context(|| format!("writing heap report to {path}"))?;
    }

    let mut out = heap.into_observer().into_inner();
    out.flush()?;
    Ok(out)
}

fn label(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'a'.checked_add(i))
        .map_or('?', char::from)
}

fn prompt_size<R: BufRead, W: Write>(
    heap: &mut DriverHeap<W>,
    input: &mut R,
    index: usize,
    quiet: bool,
) -> Result<usize> {
    let label = label(index);
    if !quiet {
        let out = heap.observer_mut().writer_mut();
        write!(out, "Enter size for allocation {label}: ")?;
        out.flush()?;
    }

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(DriverError::MissingSize { label }.into());
    }
    let trimmed = line.trim();
    let size = trimmed
        .parse::<usize>()
        .map_err(|_| DriverError::InvalidSize {
            label,
            input: trimmed.to_string(),
        })?;
    Ok(size)
}

fn allocate<W: Write>(
    heap: &mut DriverHeap<W>,
    size: usize,
    config: &AppConfig,
) -> Result<Option<Payload>> {
    let result = heap.allocate(size);
    if config.text_output() {
        let out = heap.observer_mut().writer_mut();
        match &result {
            Ok(payload) => writeln!(out, "Memory allocated at: {}", payload.offset())?,
            Err(err) => writeln!(out, "Allocation of {size} bytes failed: {err}")?,
        }
    }
    Ok(result.ok())
}

fn show<W: Write>(heap: &mut DriverHeap<W>, title: &str, config: &AppConfig) -> Result<()> {
    if config.json {
        let json = HeapReport::capture(heap).to_json()?;
        writeln!(heap.observer_mut().writer_mut(), "{json}")?;
    } else if config.text_output() {
        let listing = format_blocks(title, &heap.free_blocks());
        writeln!(heap.observer_mut().writer_mut(), "{listing}")?;
    }
    Ok(())
}

fn check<W: Write>(heap: &DriverHeap<W>, config: &AppConfig) -> Result<()> {
    if config.check {
        heap.check_invariants()?;
    }
    Ok(())
}
