//! Error type for bitstream generation.

use thiserror::Error;

/// Everything that can go wrong while producing a [`BitSequence`](crate::BitSequence).
///
/// Statistical test failures are not errors; they are reported as data by
/// the test battery. Only conditions that leave the caller without a valid,
/// balanced sequence end up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Balanced output needs an even bit count.
    #[error("bit count must be even, got {0}")]
    OddLength(usize),

    /// The bucket-filling loop hit its iteration cap before both buckets filled.
    #[error(
        "insufficient mixing: seed {seed} produced {zeros} zeros and {ones} ones \
         (target {target} each) within {iterations} iterations"
    )]
    Stall {
        seed: u64,
        iterations: usize,
        zeros: usize,
        ones: usize,
        target: usize,
    },

    /// The `3n+1` step no longer fits in the generator state.
    #[error("collatz state overflowed at iteration {iteration} (seed {seed})")]
    Overflow { seed: u64, iteration: usize },

    #[error("substitution table is not a permutation of 0..16: {0:?}")]
    InvalidTable([u8; 16]),

    #[error("chunk size must be at least one bit")]
    InvalidChunkSize,

    #[error("non-binary value {value} at index {index}")]
    NonBinary { index: usize, value: u8 },
}

pub type Result<T> = std::result::Result<T, GenerationError>;
