//! Error types for noise configuration.

use thiserror::Error;

/// Errors raised while validating or parsing a noise profile.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum NoiseError {
    /// A channel probability lies outside [0, 1] or is not finite.
    #[error("{channel} probability must lie in [0, 1], got {p}")]
    InvalidProbability {
        /// Channel name.
        channel: &'static str,
        /// Offending value.
        p: f64,
    },

    /// A shot-sampling channel requests zero shots.
    #[error("shot count must be at least 1")]
    InvalidShots,

    /// A textual profile could not be parsed.
    #[error("cannot parse noise profile {0:?}")]
    Parse(String),
}

/// Result type for noise operations.
pub type NoiseResult<T> = Result<T, NoiseError>;
