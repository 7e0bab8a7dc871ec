//! Noise channels acting on Z-basis statistics.
//!
//! Every probability channel is reduced to a symmetric per-qubit bit flip
//! with probability `f`:
//!
//! | channel        | flip probability `f` |
//! |----------------|----------------------|
//! | `Depolarizing` | `p / 2`              |
//! | `BitFlip`      | `p`                  |
//! | `Readout`      | `p`                  |
//!
//! A weight-`w` Pauli-Z product then has its expectation scaled by
//! `(1 − 2f)^w`.

use serde::{Deserialize, Serialize};

use crate::error::{NoiseError, NoiseResult};

/// A single noise channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoiseChannel {
    /// Depolarizing channel: with probability `p` the qubit is replaced by
    /// the maximally mixed state.
    Depolarizing {
        /// Error probability (0.0 to 1.0).
        p: f64,
    },

    /// Bit-flip channel: flips |0⟩ ↔ |1⟩ with probability `p`.
    BitFlip {
        /// Flip probability (0.0 to 1.0).
        p: f64,
    },

    /// Readout error: measurement reports the wrong outcome with probability `p`.
    Readout {
        /// Misclassification probability (0.0 to 1.0).
        p: f64,
    },

    /// Finite-shot estimation of each expectation value.
    Shots {
        /// Shots per estimate.
        shots: u32,
    },
}

impl NoiseChannel {
    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            NoiseChannel::Depolarizing { .. } => "depolarizing",
            NoiseChannel::BitFlip { .. } => "bit_flip",
            NoiseChannel::Readout { .. } => "readout",
            NoiseChannel::Shots { .. } => "shots",
        }
    }

    /// Position in the fixed application order.
    pub fn stage(&self) -> u8 {
        match self {
            NoiseChannel::Depolarizing { .. } => 0,
            NoiseChannel::BitFlip { .. } => 1,
            NoiseChannel::Readout { .. } => 2,
            NoiseChannel::Shots { .. } => 3,
        }
    }

    /// Equivalent per-qubit flip probability, `None` for `Shots`.
    pub fn flip_probability(&self) -> Option<f64> {
        match self {
            NoiseChannel::Depolarizing { p } => Some(p / 2.0),
            NoiseChannel::BitFlip { p } | NoiseChannel::Readout { p } => Some(*p),
            NoiseChannel::Shots { .. } => None,
        }
    }

    /// Multiplicative factor on a weight-`weight` expectation.
    ///
    /// Exactly 1.0 when the probability is zero.
    pub fn attenuation(&self, weight: usize) -> f64 {
        match self.flip_probability() {
            Some(f) if f != 0.0 => (1.0 - 2.0 * f).powi(weight as i32),
            _ => 1.0,
        }
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> NoiseResult<()> {
        match self {
            NoiseChannel::Depolarizing { p }
            | NoiseChannel::BitFlip { p }
            | NoiseChannel::Readout { p } => {
                if !p.is_finite() || !(0.0..=1.0).contains(p) {
                    return Err(NoiseError::InvalidProbability {
                        channel: self.name(),
                        p: *p,
                    });
                }
            }
            NoiseChannel::Shots { shots } => {
                if *shots == 0 {
                    return Err(NoiseError::InvalidShots);
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for NoiseChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoiseChannel::Depolarizing { p } => write!(f, "depolarizing(p={:.4})", p),
            NoiseChannel::BitFlip { p } => write!(f, "bit_flip(p={:.4})", p),
            NoiseChannel::Readout { p } => write!(f, "readout(p={:.4})", p),
            NoiseChannel::Shots { shots } => write!(f, "shots({})", shots),
        }
    }
}
