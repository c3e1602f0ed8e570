//! Fixed 4-bit substitution table used to scramble generator state.

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// A permutation of `0..16` looked up by the low nibble of the Collatz state.
///
/// The table is plain immutable data. Generators receive it through
/// [`GeneratorConfig`](crate::GeneratorConfig) so tests and experiments can
/// swap in alternates without touching generator logic.
///
/// Because of bucket filling the table never changes the emitted bit
/// pattern, only how quickly both buckets fill and whether a seed stalls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[u8; 16]", into = "[u8; 16]")]
pub struct SubstitutionTable([u8; 16]);

impl SubstitutionTable {
    /// The table the generator ships with.
    pub const DEFAULT: Self = Self([12, 5, 6, 11, 9, 0, 10, 13, 3, 14, 15, 8, 4, 7, 1, 2]);

    /// Identity permutation. Output bit equals the parity of the state.
    pub const IDENTITY: Self = Self([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);

    /// Build a table, rejecting anything that is not a permutation of `0..16`.
    pub fn new(entries: [u8; 16]) -> Result<Self, GenerationError> {
        let mut seen = 0u16;
        for &e in &entries {
            if e >= 16 || seen & (1 << e) != 0 {
                return Err(GenerationError::InvalidTable(entries));
            }
            seen |= 1 << e;
        }
        Ok(Self(entries))
    }

    /// Substituted value for a 4-bit index. Higher bits of `index` are ignored.
    pub fn lookup(&self, index: u8) -> u8 {
        self.0[(index & 0x0f) as usize]
    }

    /// Emitted bit for a generator state: parity of `table[state mod 16]`.
    pub fn output_bit(&self, state: u128) -> u8 {
        self.lookup((state % 16) as u8) & 1
    }

    pub fn entries(&self) -> [u8; 16] {
        self.0
    }
}

impl Default for SubstitutionTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<[u8; 16]> for SubstitutionTable {
    type Error = GenerationError;

    fn try_from(entries: [u8; 16]) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<SubstitutionTable> for [u8; 16] {
    fn from(table: SubstitutionTable) -> Self {
        table.0
    }
}
