//! Experiment harness error types.

use aegis_qubo::QuboError;
use aegis_solve::SolveError;
use thiserror::Error;

/// Result type for harness operations.
pub type BenchResult<T> = Result<T, BenchError>;

/// Errors that can occur while planning, running or exporting experiments.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BenchError {
    /// The experiment plan is malformed.
    #[error("Invalid plan: {0}")]
    Plan(String),

    /// Not enough data for a fit.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization error.
    #[error("Export error: {0}")]
    Export(String),

    /// Problem construction failed.
    #[error(transparent)]
    Qubo(#[from] QuboError),

    /// A solver failed outside a recorded run.
    #[error(transparent)]
    Solve(#[from] SolveError),
}

impl From<serde_json::Error> for BenchError {
    fn from(e: serde_json::Error) -> Self {
        BenchError::Export(e.to_string())
    }
}

impl From<serde_yaml_ng::Error> for BenchError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        BenchError::Plan(e.to_string())
    }
}
