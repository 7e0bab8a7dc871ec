//! Error types for the QUBO crate.

use thiserror::Error;

/// Errors produced while building a QUBO instance or its Ising form.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum QuboError {
    /// Scenario parameters are malformed (size, lengths, non-finite values).
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    /// A variable index does not exist in an instance of this size.
    #[error("variable {index} out of range for a {n}-variable problem")]
    VariableOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of variables in the problem.
        n: usize,
    },

    /// The cost matrix is not symmetric within tolerance.
    #[error("inconsistent matrix: Q[{row}][{col}] = {upper} but Q[{col}][{row}] = {lower}")]
    InconsistentMatrix {
        /// Row of the first mismatching entry.
        row: usize,
        /// Column of the first mismatching entry.
        col: usize,
        /// Value at `(row, col)`.
        upper: f64,
        /// Value at `(col, row)`.
        lower: f64,
    },

    /// A bitstring does not match the problem size.
    #[error("bitstring has {got} bits but the problem has {expected} variables")]
    SizeMismatch {
        /// Problem size.
        expected: usize,
        /// Bitstring length.
        got: usize,
    },

    /// A bitstring literal contains something other than `0` and `1`.
    #[error("invalid bitstring character {0:?}")]
    InvalidBit(char),
}

impl QuboError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        QuboError::InvalidScenario(msg.into())
    }
}

/// Result type for QUBO operations.
pub type QuboResult<T> = Result<T, QuboError>;
