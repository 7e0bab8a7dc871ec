//! Error types for the solvers.

use aegis_noise::NoiseError;
use aegis_qubo::QuboError;
use thiserror::Error;

/// Errors produced by a solver run.
///
/// Failing to converge is not an error; it is reported through
/// `SolverResult::converged`.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SolveError {
    /// The problem is too large for the chosen solver.
    #[error("{solver} refuses {n} variables (limit {limit})")]
    IntractableSize {
        /// Solver that refused the instance.
        solver: &'static str,
        /// Requested size.
        n: usize,
        /// Configured ceiling.
        limit: usize,
    },

    /// An energy evaluation produced NaN or overflowed.
    #[error("non-finite energy at iteration {iteration} (last valid iteration: {last_valid:?})")]
    NumericalInstability {
        /// Iteration whose evaluation failed.
        iteration: usize,
        /// Last iteration with a recorded finite energy.
        last_valid: Option<usize>,
    },

    /// A parameter vector has the wrong dimension for the ansatz.
    #[error("ansatz expects {expected} parameters, got {got}")]
    ParameterMismatch {
        /// Required length.
        expected: usize,
        /// Supplied length.
        got: usize,
    },

    /// The run was cancelled through its cancel flag.
    #[error("run cancelled at iteration {iteration}")]
    Cancelled {
        /// Iteration that observed the cancellation.
        iteration: usize,
    },

    /// Solver configuration is malformed.
    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),

    /// Problem model error.
    #[error(transparent)]
    Qubo(#[from] QuboError),

    /// Noise configuration error.
    #[error(transparent)]
    Noise(#[from] NoiseError),
}

/// Result type for solver operations.
pub type SolveResult<T> = Result<T, SolveError>;
