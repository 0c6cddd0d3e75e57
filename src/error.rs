//! Error types reported by the set and the command adapter

use std::collections::TryReserveError;

use thiserror::Error;

/// The key is already a live member of the set
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("key is already present in the set")]
pub struct DuplicateKey;

/// The key is not a live member of the set
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("key is not present in the set")]
pub struct NotFound;

/// Growing the slot array failed. The table is left exactly as it was before the attempt.
#[derive(Debug, Error)]
pub enum ResizeError {
    /// Doubling the capacity would overflow `usize`
    #[error("capacity {current} cannot be doubled without overflow")]
    CapacityOverflow {
        /// Capacity at the time of the attempt
        current: usize,
    },
    /// The allocator refused the new slot array
    #[error("failed to allocate {requested} slots")]
    Allocation {
        /// Number of slots requested
        requested: usize,
        /// Underlying allocation error
        #[source]
        source: TryReserveError,
    },
    /// A live key found no empty slot in its probe sequence over the new array
    #[error("no empty slot on the probe sequence at capacity {capacity}")]
    ProbeExhausted {
        /// Capacity of the array being filled
        capacity: usize,
    },
}

/// Why an insert did not add the key
#[derive(Debug, Error)]
pub enum InsertError {
    /// The key is already live. This is an expected outcome, not a failure of the table.
    #[error(transparent)]
    Duplicate(#[from] DuplicateKey),
    /// The resize that had to run before the insert failed
    #[error("resize before insert failed")]
    Resize(#[from] ResizeError),
    /// Neither an empty nor a tombstoned slot was found along the whole probe sequence
    #[error("probe sequence exhausted at capacity {capacity}")]
    ProbeExhausted {
        /// Capacity of the table
        capacity: usize,
    },
}

impl InsertError {
    /// Returns true when the error is the expected duplicate outcome
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

/// Errors that abort a command run
#[derive(Debug, Error)]
pub enum CommandError {
    /// Reading commands or writing answers failed
    #[error("i/o error while processing commands")]
    Io(#[from] std::io::Error),
    /// The set could not complete an insert
    #[error("insert of key {key:?} failed")]
    Insert {
        /// Key of the failing command
        key: String,
        /// Underlying set error
        #[source]
        source: InsertError,
    },
}
