//! Event presenter for the driver.

use std::io::Write;

use fibheap_core::{HeapEvent, HeapObserver};

/// Prints heap events as they happen.
///
/// Splits and merges are only shown in trace mode; quiet mode shows nothing.
pub struct EventPresenter<W: Write> {
    out: W,
    trace: bool,
    quiet: bool,
}

impl<W: Write> EventPresenter<W> {
    /// Create a presenter writing to `out`.
    #[must_use]
    pub fn new(out: W, trace: bool, quiet: bool) -> Self {
        Self { out, trace, quiet }
    }

    /// The underlying writer, for output that interleaves with events.
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Consume the presenter, returning its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(event: &HeapEvent, trace: bool) -> Option<String> {
        let line = match *event {
            HeapEvent::Initialized {
                offset,
                size,
                order,
                ..
            } => format!(
                "Initialized heap with block at {offset}, size: {size} (Fib index: {order})"
            ),
            HeapEvent::Allocated {
                offset,
                size,
                order,
                requested,
                ..
            } => format!(
                "Allocated block at {offset}, total size: {size} (Fib index: {order}) for request: {requested}"
            ),
            HeapEvent::Freed {
                offset,
                size,
                order,
            } => format!("Freeing block at {offset}, size: {size} (Fib index: {order})"),
            HeapEvent::Split {
                offset,
                order,
                right_offset,
            } if trace => {
                format!("Splitting block at {offset} (Fib index: {order}) at {right_offset}")
            }
            HeapEvent::Merged {
                left, right, order, ..
            } if trace => format!("Merging blocks at {left} and {right} (Fib index: {order})"),
            _ => return None,
        };
        Some(line)
    }
}

impl<W: Write> HeapObserver for EventPresenter<W> {
    fn on_event(&mut self, event: &HeapEvent) {
        if self.quiet {
            return;
        }
        if let Some(line) = Self::line(event, self.trace) {
            let _ = writeln!(self.out, "{line}");
        }
    }
}
