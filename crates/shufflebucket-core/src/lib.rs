//! # shufflebucket-core
//!
//! Deterministic, balanced bitstreams from the Collatz (`3n+1`) iteration.
//!
//! ## Quick Start
//!
//! ```
//! use shufflebucket_core::{DatasetExpander, generate_bits};
//!
//! // 32 bits, exactly 16 zeros and 16 ones
//! let bits = generate_bits(1923, 32).unwrap();
//! assert_eq!(bits.ones(), 16);
//!
//! // Large datasets are assembled from re-seeded 1024-bit chunks
//! let data = DatasetExpander::default().expand(1923, 10_000).unwrap();
//! assert_eq!(data.len(), 10_000);
//! ```
//!
//! ## Architecture
//!
//! Seed → Collatz walk → SubstitutionTable → zero/one buckets → seeded shuffle
//!
//! The bucket scheme guarantees balance by construction: surplus bits of
//! whichever value is already full are discarded. This makes the output a
//! useful subject for a statistical battery, not a secure PRNG.

pub mod bits;
pub mod error;
pub mod expander;
pub mod generator;
pub mod sbox;

pub use bits::BitSequence;
pub use error::{GenerationError, Result};
pub use expander::{DEFAULT_CHUNK_BITS, DatasetExpander, generate_large_dataset, next_seed};
pub use generator::{BitstreamGenerator, DEFAULT_MAX_ITERATIONS, GeneratorConfig, generate_bits};
pub use sbox::SubstitutionTable;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
