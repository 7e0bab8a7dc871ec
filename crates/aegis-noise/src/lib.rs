//! `aegis-noise`: noise models for simulated variational runs.
//!
//! A [`NoiseProfile`] names a set of [`NoiseChannel`]s. The
//! [`NoiseInjector`] applies them to ideal simulator output:
//!
//! - each Ising term's expectation is attenuated by `(1 − 2f)^w` per channel
//!   and, with a `Shots` channel, replaced by a seeded binomial estimate;
//! - the final basis-state distribution is mixed with its single-bit-flipped
//!   neighbours before the measured bitstring is extracted.
//!
//! Channels are applied in the fixed order Depolarizing → BitFlip → Readout
//! → Shots. A profile whose probabilities are all zero changes nothing, bit
//! for bit.
//!
//! ```rust
//! use aegis_noise::{NoiseInjector, NoiseProfile};
//! use aegis_qubo::IsingTerm;
//!
//! let mut injector = NoiseInjector::new(&NoiseProfile::readout(0.05), 7).unwrap();
//! let noisy = injector.perturb(1.0, &IsingTerm::z(0, 1.0));
//! assert!((noisy - 0.9).abs() < 1e-12);
//! ```

pub mod channel;
pub mod error;
pub mod injector;
pub mod profile;

pub use channel::NoiseChannel;
pub use error::{NoiseError, NoiseResult};
pub use injector::NoiseInjector;
pub use profile::NoiseProfile;
