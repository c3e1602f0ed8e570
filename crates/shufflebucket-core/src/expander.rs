//! Chain generator calls into arbitrarily long bit sequences.
//!
//! Chunk `i+1` is generated from `seed_{i+1} = (seed_i * A + C) mod M`, the
//! classic ANSI C LCG constants, so consecutive chunks are not repeats of one
//! another.

use log::debug;

use crate::bits::BitSequence;
use crate::error::{GenerationError, Result};
use crate::generator::{BitstreamGenerator, GeneratorConfig};

/// Largest chunk requested from the generator per call unless configured.
pub const DEFAULT_CHUNK_BITS: usize = 1024;

pub const LCG_MULTIPLIER: u64 = 1_103_515_245;
pub const LCG_INCREMENT: u64 = 12_345;
pub const LCG_MODULUS: u64 = 1 << 31;

/// Advance a chunk seed by one LCG step.
pub fn next_seed(seed: u64) -> u64 {
    ((seed as u128 * LCG_MULTIPLIER as u128 + LCG_INCREMENT as u128) % LCG_MODULUS as u128)
        as u64
}

#[derive(Debug, Clone, Copy)]
pub struct DatasetExpander {
    generator: BitstreamGenerator,
    chunk_bits: usize,
}

impl Default for DatasetExpander {
    fn default() -> Self {
        Self {
            generator: BitstreamGenerator::default(),
            chunk_bits: DEFAULT_CHUNK_BITS,
        }
    }
}

impl DatasetExpander {
    pub fn new(config: GeneratorConfig, chunk_bits: usize) -> Result<Self> {
        if chunk_bits == 0 {
            return Err(GenerationError::InvalidChunkSize);
        }
        Ok(Self {
            generator: BitstreamGenerator::new(config),
            chunk_bits,
        })
    }

    /// Produce exactly `total_bits` bits starting from `seed`.
    ///
    /// Each request is rounded up to an even size so odd totals and odd chunk
    /// sizes still terminate; the surplus is cut from the final chunk. The
    /// first failing chunk aborts the whole expansion.
    pub fn expand(&self, seed: u64, total_bits: usize) -> Result<BitSequence> {
        let mut bits = Vec::with_capacity(total_bits + 1);
        let mut current = seed;
        let mut chunks = 0usize;

        while bits.len() < total_bits {
            let remaining = total_bits - bits.len();
            let request = round_up_even(remaining.min(self.chunk_bits));
            let chunk = self.generator.generate(current, request)?;
            bits.extend_from_slice(&chunk);
            chunks += 1;
            current = next_seed(current);
        }
        bits.truncate(total_bits);

        debug!("expanded seed {seed} into {total_bits} bits over {chunks} chunks");
        Ok(BitSequence::from_trusted(bits))
    }
}

fn round_up_even(n: usize) -> usize {
    n + (n & 1)
}

/// Shorthand for [`DatasetExpander::expand`] with the default generator and chunk size.
pub fn generate_large_dataset(seed: u64, total_bits: usize) -> Result<BitSequence> {
    DatasetExpander::default().expand(seed, total_bits)
}
