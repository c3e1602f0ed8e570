//! Balanced bitstream generator: Collatz walk, substitution, bucket filling,
//! then a seeded shuffle.
//!
//! Each step advances the working value by `n/2` or `3n+1`, looks the new
//! value's low nibble up in the [`SubstitutionTable`] and emits the parity of
//! the result. Emitted bits are sorted into a zeros bucket and a ones bucket,
//! each capped at half the requested length; extra bits are discarded. When
//! both buckets are full the concatenation is shuffled with a ChaCha8 stream
//! keyed by the seed.
//!
//! The filled buckets always hold `L/2` zeros then `L/2` ones, so the
//! returned bits depend only on `(seed, L)`. The table decides how many
//! steps that takes, and whether the cap is hit at all.

use log::{debug, warn};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::bits::BitSequence;
use crate::error::{GenerationError, Result};
use crate::sbox::SubstitutionTable;

/// Iteration cap applied when none is configured.
pub const DEFAULT_MAX_ITERATIONS: usize = 50_000;

/// Generator parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub table: SubstitutionTable,
    /// Collatz steps allowed per call before giving up with
    /// [`GenerationError::Stall`].
    pub max_iterations: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            table: SubstitutionTable::DEFAULT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Working value of one generation call.
#[derive(Debug, Clone, Copy)]
struct CollatzState {
    value: u128,
}

impl CollatzState {
    fn new(seed: u64) -> Self {
        Self {
            value: seed as u128,
        }
    }

    /// Apply one Collatz step and return the new value, or `None` on overflow.
    fn step(&mut self) -> Option<u128> {
        self.value = if self.value % 2 == 0 {
            self.value / 2
        } else {
            self.value.checked_mul(3)?.checked_add(1)?
        };
        Some(self.value)
    }
}

/// Two fixed-capacity buckets laid out back to back in one buffer.
///
/// Zeros occupy `[0, half)` and ones `[half, 2*half)`, so the filled buffer is
/// already the bucket-0-then-bucket-1 concatenation.
struct Buckets {
    buf: Vec<u8>,
    half: usize,
    filled: [usize; 2],
}

impl Buckets {
    fn new(half: usize) -> Self {
        Self {
            buf: vec![0; half * 2],
            half,
            filled: [0, 0],
        }
    }

    fn offer(&mut self, bit: u8) {
        let b = bit as usize;
        if self.filled[b] < self.half {
            self.buf[b * self.half + self.filled[b]] = bit;
            self.filled[b] += 1;
        }
    }

    fn is_full(&self) -> bool {
        self.filled[0] == self.half && self.filled[1] == self.half
    }
}

/// Seed-driven generator of balanced bit sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitstreamGenerator {
    config: GeneratorConfig,
}

impl BitstreamGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generate exactly `num_bits` bits, half zeros and half ones.
    ///
    /// The same `(seed, num_bits)` always yields the same sequence. Fails with
    /// [`GenerationError::Stall`] if the iteration cap is reached first; a
    /// partially filled sequence is never returned.
    pub fn generate(&self, seed: u64, num_bits: usize) -> Result<BitSequence> {
        if num_bits % 2 != 0 {
            return Err(GenerationError::OddLength(num_bits));
        }
        let half = num_bits / 2;
        let mut buckets = Buckets::new(half);
        let mut state = CollatzState::new(seed);
        let mut iterations = 0usize;

        while !buckets.is_full() {
            if iterations >= self.config.max_iterations {
                warn!(
                    "seed {seed}: stalled after {iterations} iterations ({}/{half} zeros, {}/{half} ones)",
                    buckets.filled[0], buckets.filled[1]
                );
                return Err(GenerationError::Stall {
                    seed,
                    iterations,
                    zeros: buckets.filled[0],
                    ones: buckets.filled[1],
                    target: half,
                });
            }
            iterations += 1;
            let value = state
                .step()
                .ok_or(GenerationError::Overflow { seed, iteration: iterations })?;
            buckets.offer(self.config.table.output_bit(value));
        }
        debug!("seed {seed}: {num_bits} bits in {iterations} iterations");

        let mut bits = buckets.buf;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        bits.shuffle(&mut rng);
        Ok(BitSequence::from_trusted(bits))
    }
}

/// Shorthand for [`BitstreamGenerator::generate`] with the default config.
pub fn generate_bits(seed: u64, num_bits: usize) -> Result<BitSequence> {
    BitstreamGenerator::default().generate(seed, num_bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collatz_step_follows_recurrence() {
        let mut s = CollatzState::new(27);
        assert_eq!(s.step(), Some(82));
        assert_eq!(s.step(), Some(41));
        assert_eq!(s.step(), Some(124));
    }

    #[test]
    fn collatz_step_reports_overflow() {
        let mut s = CollatzState { value: u128::MAX };
        assert_eq!(s.step(), None);
    }

    #[test]
    fn output_is_balanced() {
        for seed in [1u64, 7, 27, 1923, 65_537, u32::MAX as u64] {
            let bits = generate_bits(seed, 512).unwrap();
            assert_eq!(bits.len(), 512);
            assert_eq!(bits.ones(), 256, "seed {seed}");
            assert_eq!(bits.zeros(), 256, "seed {seed}");
        }
    }

    #[test]
    fn output_is_deterministic() {
        let a = generate_bits(1923, 1024).unwrap();
        let b = generate_bits(1923, 1024).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_shuffle_differently() {
        let a = generate_bits(1923, 256).unwrap();
        let b = generate_bits(1924, 256).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn shuffle_breaks_bucket_order() {
        let bits = generate_bits(1923, 256).unwrap();
        let sorted_prefix = bits[..128].iter().all(|&b| b == 0);
        assert!(!sorted_prefix);
    }

    #[test]
    fn zero_length_is_empty() {
        assert!(generate_bits(0, 0).unwrap().is_empty());
    }

    #[test]
    fn odd_length_is_rejected() {
        assert_eq!(generate_bits(5, 33), Err(GenerationError::OddLength(33)));
    }

    #[test]
    fn seed_zero_stalls() {
        // 0 is a fixed point of the recurrence and table[0] is even.
        match generate_bits(0, 64) {
            Err(GenerationError::Stall {
                seed,
                iterations,
                zeros,
                ones,
                target,
            }) => {
                assert_eq!(seed, 0);
                assert_eq!(iterations, DEFAULT_MAX_ITERATIONS);
                assert_eq!(zeros, 32);
                assert_eq!(ones, 0);
                assert_eq!(target, 32);
            }
            other => panic!("expected stall, got {other:?}"),
        }
    }

    #[test]
    fn iteration_cap_is_configurable() {
        // Seed 1: 1 -> 4 (table 9, odd) -> 2 (table 6, even). Two steps suffice.
        let tight = BitstreamGenerator::new(GeneratorConfig {
            max_iterations: 2,
            ..GeneratorConfig::default()
        });
        assert_eq!(tight.generate(1, 2).unwrap().ones(), 1);

        let tighter = BitstreamGenerator::new(GeneratorConfig {
            max_iterations: 1,
            ..GeneratorConfig::default()
        });
        assert!(matches!(
            tighter.generate(1, 2),
            Err(GenerationError::Stall { iterations: 1, .. })
        ));
    }

    #[test]
    fn cap_below_length_always_stalls() {
        let g = BitstreamGenerator::new(GeneratorConfig {
            max_iterations: 100,
            ..GeneratorConfig::default()
        });
        assert!(matches!(g.generate(1923, 512), Err(GenerationError::Stall { .. })));
    }

    #[test]
    fn table_is_injected() {
        // Entries at 1, 2 and 4 are even, so the 4 -> 2 -> 1 cycle never emits a one.
        let table =
            SubstitutionTable::new([1, 0, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15])
                .unwrap();
        let starved = BitstreamGenerator::new(GeneratorConfig {
            table,
            ..GeneratorConfig::default()
        });
        assert!(matches!(
            starved.generate(1, 64),
            Err(GenerationError::Stall { seed: 1, ones: 0, zeros: 32, .. })
        ));
        assert_eq!(generate_bits(1, 64).unwrap().ones(), 32);
    }

    #[test]
    fn table_does_not_change_output_bits() {
        let identity = BitstreamGenerator::new(GeneratorConfig {
            table: SubstitutionTable::IDENTITY,
            ..GeneratorConfig::default()
        });
        assert_eq!(
            identity.generate(1923, 256).unwrap(),
            generate_bits(1923, 256).unwrap()
        );
    }
}
