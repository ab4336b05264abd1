//! Error types for the allocation engine.
//!
//! `PoolError` covers everything caused by bad input and is returned to the
//! caller. `InvariantViolation` marks a defect in the engine itself; it is a
//! separate type with no conversion into `PoolError` and is only ever raised
//! through [`invariant_violated`], which aborts the operation.

use thiserror::Error;

/// User-facing allocation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("invalid superblock '{superblock}': {reason}")]
    InvalidSuperblock { superblock: String, reason: String },

    #[error("allocations overlap or are out of bounds of the superblock: {0}")]
    OverlapOrOutOfBounds(String),

    #[error("invalid prefix length /{prefix_len}, must be at most /32")]
    InvalidPrefixLength { prefix_len: u8 },

    #[error("no space to allocate a /{prefix_len} subnet")]
    NoSpaceAvailable { prefix_len: u8 },

    #[error("suballocations of {network} are nested deeper than {max_depth} levels")]
    NestingTooDeep { network: String, max_depth: usize },
}

/// An internal consistency failure of the engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("partition of {superblock} stalled at {address}: no block size fits")]
    PartitionStalled { superblock: String, address: String },

    #[error("allocated block {network} broke pool invariants: {source}")]
    DefectiveAllocation { network: String, source: PoolError },
}

/// Abort on an engine defect.
pub fn invariant_violated(fault: InvariantViolation) -> ! {
    panic!("internal invariant violated: {}", fault)
}
