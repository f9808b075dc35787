//! Observer pattern for heap events.
//!
//! The heap reports every structural change (split, merge, allocation, free)
//! to an observer. The default observer does nothing; the driver plugs in a
//! printing one and tests record the event stream.

use serde::Serialize;
use tracing::debug;

/// A structural change made by the heap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeapEvent {
    /// The arena was seeded with its single initial free block.
    Initialized {
        /// Arena capacity in bytes.
        capacity: usize,
        /// Offset of the initial block.
        offset: usize,
        /// Size of the initial block.
        size: usize,
        /// Order of the initial block.
        order: usize,
    },
    /// A free block of `order` at `offset` was split in two.
    Split {
        /// Offset of the split block (and of the new left block).
        offset: usize,
        /// Order of the split block.
        order: usize,
        /// Offset of the new right block.
        right_offset: usize,
    },
    /// A block was handed out.
    Allocated {
        /// Offset of the block header.
        offset: usize,
        /// Offset of the payload.
        payload: usize,
        /// Total block size.
        size: usize,
        /// Block order.
        order: usize,
        /// Payload bytes asked for.
        requested: usize,
    },
    /// An allocation request was refused.
    AllocationFailed {
        /// Payload bytes asked for.
        requested: usize,
    },
    /// A block was returned to the free list.
    Freed {
        /// Offset of the block header.
        offset: usize,
        /// Total block size.
        size: usize,
        /// Block order.
        order: usize,
    },
    /// Two buddies were merged.
    Merged {
        /// Offset of the left buddy, which the merged block keeps.
        left: usize,
        /// Offset of the right buddy.
        right: usize,
        /// Order of the merged block.
        order: usize,
        /// Size of the merged block.
        size: usize,
    },
}

/// Observer trait for receiving heap events.
pub trait HeapObserver {
    /// Receive an event.
    fn on_event(&mut self, event: &HeapEvent);
}

impl<O: HeapObserver + ?Sized> HeapObserver for Box<O> {
    fn on_event(&mut self, event: &HeapEvent) {
        (**self).on_event(event);
    }
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpObserver;

impl NoOpObserver {
    /// Create a new no-op observer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HeapObserver for NoOpObserver {
    fn on_event(&mut self, _event: &HeapEvent) {}
}

/// Observer that forwards events to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl LoggingObserver {
    /// Create a new logging observer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HeapObserver for LoggingObserver {
    fn on_event(&mut self, event: &HeapEvent) {
        match event {
            HeapEvent::Split {
                offset,
                order,
                right_offset,
            } => debug!(offset, order, right_offset, "split"),
            HeapEvent::Merged {
                left,
                right,
                order,
                size,
            } => debug!(left, right, order, size, "merged"),
            other => debug!(event = ?other, "heap event"),
        }
    }
}

/// Observer that keeps every event it receives.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    events: Vec<HeapEvent>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far, oldest first.
    #[must_use]
    pub fn events(&self) -> &[HeapEvent] {
        &self.events
    }

    /// Take the recorded events, leaving the recorder empty.
    pub fn take(&mut self) -> Vec<HeapEvent> {
        std::mem::take(&mut self.events)
    }
}

impl HeapObserver for RecordingObserver {
    fn on_event(&mut self, event: &HeapEvent) {
        self.events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_observer_keeps_order() {
        let mut recorder = RecordingObserver::new();
        recorder.on_event(&HeapEvent::AllocationFailed { requested: 1 });
        recorder.on_event(&HeapEvent::Freed {
            offset: 0,
            size: 5,
            order: 3,
        });
        assert_eq!(recorder.events().len(), 2);
        assert_eq!(
            recorder.events()[0],
            HeapEvent::AllocationFailed { requested: 1 }
        );
        let taken = recorder.take();
        assert_eq!(taken.len(), 2);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn boxed_observer_forwards() {
        let mut boxed: Box<dyn HeapObserver> = Box::new(NoOpObserver::new());
        boxed.on_event(&HeapEvent::AllocationFailed { requested: 1 });
        let mut logging = LoggingObserver::new();
        logging.on_event(&HeapEvent::Split {
            offset: 0,
            order: 6,
            right_offset: 13,
        });
    }

    #[test]
    fn events_serialize_tagged() {
        let json = serde_json::to_string(&HeapEvent::Merged {
            left: 0,
            right: 8,
            order: 5,
            size: 13,
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"event":"merged","left":0,"right":8,"order":5,"size":13}"#
        );
    }
}
