//! Error types for ring buffer operations.

use std::io;
use thiserror::Error;

/// Errors that can occur in buffer operations.
///
/// Running out of data is not an error: non-blocking reads report it with
/// `None` and timed reads with a short count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// The buffer was configured with zero capacity.
    #[error("invalid capacity {capacity}: capacity must be greater than zero")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },

    /// `reset()` was called while no mark was set.
    #[error("no position marked")]
    NoMark,

    /// A blocking read was woken by `interrupt()`.
    #[error("blocking read interrupted after {transferred} bytes")]
    Interrupted {
        /// Bytes already read or skipped by the call before it was interrupted.
        transferred: usize,
    },
}

impl BufferError {
    /// Returns `true` if the caller may simply retry the operation.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }

    /// Returns `true` if this error reports a violated precondition.
    #[inline]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::InvalidCapacity { .. } | Self::NoMark)
    }
}

impl From<BufferError> for io::Error {
    fn from(err: BufferError) -> Self {
        let kind = match err {
            BufferError::InvalidCapacity { .. } | BufferError::NoMark => io::ErrorKind::InvalidInput,
            BufferError::Interrupted { .. } => io::ErrorKind::Interrupted,
        };
        io::Error::new(kind, err)
    }
}
