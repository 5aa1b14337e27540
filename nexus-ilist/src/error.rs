//! Error types for queue operations.
//!
//! Failures are local and reported through return values. An empty queue is
//! not an error: removals return `None`, filters return `0`.

use core::fmt;
use std::collections::TryReserveError;

/// An allocation needed by an insert could not be satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// The element or queue storage has no free slot.
    StorageFull,
    /// The payload buffer could not be reserved.
    Payload(TryReserveError),
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::StorageFull => write!(f, "storage is full"),
            AllocError::Payload(e) => write!(f, "payload allocation failed: {e}"),
        }
    }
}

impl std::error::Error for AllocError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AllocError::StorageFull => None,
            AllocError::Payload(e) => Some(e),
        }
    }
}

impl From<TryReserveError> for AllocError {
    fn from(e: TryReserveError) -> Self {
        AllocError::Payload(e)
    }
}

/// Error returned by handle-based queue operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The queue handle is null or was already freed.
    InvalidHandle,
    /// An allocation failed; the queue was left untouched.
    AllocationFailure(AllocError),
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::InvalidHandle => write!(f, "invalid queue handle"),
            QueueError::AllocationFailure(e) => write!(f, "allocation failure: {e}"),
        }
    }
}

impl std::error::Error for QueueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueueError::InvalidHandle => None,
            QueueError::AllocationFailure(e) => Some(e),
        }
    }
}

impl From<AllocError> for QueueError {
    fn from(e: AllocError) -> Self {
        QueueError::AllocationFailure(e)
    }
}

/// Error during storage or pool construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Capacity is zero.
    ZeroCapacity,
    /// Capacity reaches the key type's reserved sentinel value.
    CapacityExceedsKey {
        /// Requested capacity.
        capacity: usize,
        /// Largest capacity the key type can address.
        max: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroCapacity => write!(f, "capacity must be greater than zero"),
            ConfigError::CapacityExceedsKey { capacity, max } => {
                write!(f, "capacity ({capacity}) exceeds key type maximum ({max})")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
