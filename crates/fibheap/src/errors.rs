//! Error handling and exit codes.

use thiserror::Error;

use fibheap_core::constants::exit_codes;
use fibheap_core::HeapError;

/// Errors raised by the driver itself rather than the heap.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DriverError {
    /// A size typed on stdin could not be parsed.
    #[error("invalid size for allocation {label}: {input:?}")]
    InvalidSize {
        /// Allocation label (`a`, `b`, ...).
        label: char,
        /// The offending input, trimmed.
        input: String,
    },

    /// Stdin ended before every size was read.
    #[error("input ended before a size for allocation {label} was given")]
    MissingSize {
        /// Allocation label.
        label: char,
    },
}

/// Map a heap error to the process exit code.
pub fn handle_error(err: &HeapError) -> i32 {
    match err {
        HeapError::CapacityTooSmall { .. }
        | HeapError::NoFittingOrder { .. }
        | HeapError::ArenaAllocation { .. } => exit_codes::ERROR_CONFIG,
        HeapError::RequestTooLarge { .. }
        | HeapError::AllocationFailed { .. }
        | HeapError::SplitUnderflow { .. } => exit_codes::ERROR_ALLOCATION,
        HeapError::Corrupted(_) => exit_codes::ERROR_CORRUPTED,
        HeapError::InvalidFree { .. } | HeapError::DoubleFree { .. } => exit_codes::ERROR_GENERIC,
    }
}

/// Exit code for any error returned by [`run`](crate::app::run).
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<HeapError>()
        .map_or(exit_codes::ERROR_GENERIC, handle_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes() {
        assert_eq!(
            handle_error(&HeapError::CapacityTooSmall {
                capacity: 3,
                required: 41
            }),
            4
        );
        assert_eq!(
            handle_error(&HeapError::AllocationFailed { size: 1, order: 0 }),
            2
        );
        assert_eq!(handle_error(&HeapError::Corrupted("gap".into())), 3);
        assert_eq!(
            handle_error(&HeapError::ArenaAllocation { capacity: 1 << 40 }),
            4
        );
        assert_eq!(handle_error(&HeapError::DoubleFree { payload: 9 }), 1);
    }

    #[test]
    fn exit_code_downcasts() {
        let err = anyhow::Error::new(HeapError::NoFittingOrder { capacity: 0 });
        assert_eq!(exit_code(&err), exit_codes::ERROR_CONFIG);
        let err = anyhow::Error::new(DriverError::MissingSize { label: 'c' });
        assert_eq!(exit_code(&err), exit_codes::ERROR_GENERIC);
        assert_eq!(
            err.to_string(),
            "input ended before a size for allocation c was given"
        );
    }
}
