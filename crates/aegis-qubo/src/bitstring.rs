//! Binary assignments over the problem variables.
//!
//! Bit `i` is variable `xᵢ` and also qubit `i` of the simulated register, so
//! basis index `k` maps to the bitstring whose bit `i` is `(k >> i) & 1`.
//! The textual form lists `x₀` first, so index `0b0001` over four variables
//! prints as `"1000"`.

use serde::{Deserialize, Serialize};

use crate::error::QuboError;

/// An assignment of 0/1 values to N variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Bitstring {
    bits: Vec<bool>,
}

impl Bitstring {
    /// All-zero assignment over `n` variables.
    pub fn zeros(n: usize) -> Self {
        Self {
            bits: vec![false; n],
        }
    }

    /// All-one assignment over `n` variables.
    pub fn ones(n: usize) -> Self {
        Self {
            bits: vec![true; n],
        }
    }

    /// Build from explicit bit values.
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Decode a little-endian basis index over `n` variables.
    pub fn from_index(index: usize, n: usize) -> Self {
        Self {
            bits: (0..n).map(|i| (index >> i) & 1 == 1).collect(),
        }
    }

    /// Encode as a little-endian basis index.
    pub fn to_index(&self) -> usize {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .fold(0, |acc, (i, _)| acc | (1 << i))
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True for a zero-length assignment.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Value of variable `i`.
    pub fn get(&self, i: usize) -> bool {
        self.bits[i]
    }

    /// Value of variable `i` as `0.0` / `1.0`.
    pub fn value(&self, i: usize) -> f64 {
        if self.bits[i] { 1.0 } else { 0.0 }
    }

    /// Flip variable `i` in place.
    pub fn flip(&mut self, i: usize) {
        self.bits[i] = !self.bits[i];
    }

    /// Copy with variable `i` flipped.
    #[must_use]
    pub fn flipped(&self, i: usize) -> Self {
        let mut out = self.clone();
        out.flip(i);
        out
    }

    /// Number of variables set to 1.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Indices of the variables set to 1.
    pub fn ones_indices(&self) -> Vec<usize> {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.then_some(i))
            .collect()
    }

    /// The raw bits.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }
}

impl std::fmt::Display for Bitstring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in &self.bits {
            f.write_str(if *b { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Bitstring {
    type Err = QuboError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(QuboError::InvalidBit(other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::from_bits)
    }
}

impl TryFrom<String> for Bitstring {
    type Error = QuboError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Bitstring> for String {
    fn from(b: Bitstring) -> Self {
        b.to_string()
    }
}
