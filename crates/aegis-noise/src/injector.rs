//! Noise injection into simulated expectation values and distributions.

use aegis_qubo::IsingTerm;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::channel::NoiseChannel;
use crate::error::NoiseResult;
use crate::profile::NoiseProfile;

/// Applies a [`NoiseProfile`] to ideal simulation output.
///
/// The injector owns its own generator so that shot sampling never draws
/// from another component's random stream.
#[derive(Debug, Clone)]
pub struct NoiseInjector {
    channels: Vec<NoiseChannel>,
    rng: StdRng,
}

impl NoiseInjector {
    /// Validate `profile` and seed the shot sampler.
    pub fn new(profile: &NoiseProfile, seed: u64) -> NoiseResult<Self> {
        profile.validate()?;
        // zero-probability channels are exact identities
        let channels = if profile.is_noiseless() {
            Vec::new()
        } else {
            profile.ordered_channels()
        };
        debug!(profile = %profile, stages = channels.len(), "noise injector configured");
        Ok(Self {
            channels,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// An injector that changes nothing.
    pub fn ideal() -> Self {
        Self {
            channels: Vec::new(),
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// Channels in application order.
    pub fn channels(&self) -> &[NoiseChannel] {
        &self.channels
    }

    /// Noisy estimate of a term's expectation value.
    pub fn perturb(&mut self, ideal: f64, term: &IsingTerm) -> f64 {
        self.perturb_weight(ideal, term.weight())
    }

    /// Noisy estimate of the expectation of a weight-`weight` Z product.
    pub fn perturb_weight(&mut self, ideal: f64, weight: usize) -> f64 {
        let mut value = ideal;
        for channel in &self.channels {
            match channel {
                NoiseChannel::Shots { shots } => {
                    value = sample_estimate(&mut self.rng, value, *shots);
                }
                other => value *= other.attenuation(weight),
            }
        }
        value
    }

    /// Mix a basis-state distribution through every flip channel.
    ///
    /// `probs.len()` must be a power of two; index bit `q` is qubit `q`.
    pub fn perturb_distribution(&self, probs: &mut [f64]) {
        let dim = probs.len();
        let n_qubits = dim.trailing_zeros() as usize;
        for channel in &self.channels {
            let Some(f) = channel.flip_probability() else {
                continue;
            };
            if f == 0.0 {
                continue;
            }
            for q in 0..n_qubits {
                let bit = 1usize << q;
                for i in (0..dim).filter(|i| i & bit == 0) {
                    let j = i | bit;
                    let (a, b) = (probs[i], probs[j]);
                    probs[i] = (1.0 - f) * a + f * b;
                    probs[j] = (1.0 - f) * b + f * a;
                }
            }
        }
    }
}

/// `2·Bin(shots, (1+e)/2)/shots − 1`
///
/// Non-finite expectations pass through unsampled.
fn sample_estimate<R: Rng>(rng: &mut R, expectation: f64, shots: u32) -> f64 {
    if !expectation.is_finite() {
        return expectation;
    }
    let p_plus = ((1.0 + expectation) / 2.0).clamp(0.0, 1.0);
    let hits = (0..shots).filter(|_| rng.gen_bool(p_plus)).count();
    2.0 * hits as f64 / f64::from(shots) - 1.0
}
