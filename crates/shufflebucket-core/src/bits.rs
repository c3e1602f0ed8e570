//! Immutable sequence of 0/1 values shared by every statistical test.

use std::ops::Deref;

use serde::Serialize;

use crate::error::GenerationError;

/// Ordered bits, one `u8` per bit, each either 0 or 1.
///
/// Once built the sequence is read-only; it derefs to `&[u8]` so the test
/// battery can borrow it from as many threads as it likes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BitSequence(Vec<u8>);

impl BitSequence {
    /// Wrap a vector of bits, rejecting any value other than 0 or 1.
    pub fn from_bits(bits: Vec<u8>) -> Result<Self, GenerationError> {
        if let Some((index, &value)) = bits.iter().enumerate().find(|(_, b)| **b > 1) {
            return Err(GenerationError::NonBinary { index, value });
        }
        Ok(Self(bits))
    }

    /// Unpack bytes MSB first.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut bits = Vec::with_capacity(data.len() * 8);
        for &byte in data {
            for shift in (0..8).rev() {
                bits.push((byte >> shift) & 1);
            }
        }
        Self(bits)
    }

    pub(crate) fn from_trusted(bits: Vec<u8>) -> Self {
        debug_assert!(bits.iter().all(|&b| b <= 1));
        Self(bits)
    }

    pub fn ones(&self) -> usize {
        self.0.iter().filter(|&&b| b == 1).count()
    }

    pub fn zeros(&self) -> usize {
        self.0.len() - self.ones()
    }

    /// Pack full 8-bit groups MSB first. A trailing partial byte is dropped.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0
            .chunks_exact(8)
            .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b))
            .collect()
    }

    /// Pack full `width`-bit groups MSB first into integers.
    ///
    /// Widths above 64 are treated as 64; a zero width yields nothing.
    pub fn to_words(&self, width: usize) -> Vec<u64> {
        let width = width.min(64);
        if width == 0 {
            return Vec::new();
        }
        self.0
            .chunks_exact(width)
            .map(|chunk| chunk.iter().fold(0u64, |acc, &b| (acc << 1) | b as u64))
            .collect()
    }

    /// Render as a string of `'0'` and `'1'` characters.
    pub fn to_bit_string(&self) -> String {
        self.0.iter().map(|&b| if b == 1 { '1' } else { '0' }).collect()
    }
}

impl Deref for BitSequence {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for BitSequence {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
