//! `aegis-solve`: classical and variational QUBO solvers.
//!
//! - [`BruteForce`] enumerates all 2^N assignments (the ground truth).
//! - [`Greedy`] descends by single-bit flips to a local optimum.
//! - [`VariationalEngine`] minimises `⟨ψ(θ)|H|ψ(θ)⟩` over a VQE-style or
//!   QAOA-style ansatz with SPSA, Nelder-Mead or compass search, optionally
//!   through a noise profile, and samples the final state for a bitstring.
//!
//! Every solver returns a [`SolverResult`] with the bitstring, its QUBO cost,
//! an energy [`Trajectory`] and the wall-clock duration.
//!
//! # Quick start
//!
//! ```rust
//! use aegis_qubo::TacticalScenario;
//! use aegis_solve::{AnsatzKind, BruteForce, VariationalConfig, VariationalEngine};
//!
//! let qubo = TacticalScenario::random(4, 1).build().unwrap();
//! let exact = BruteForce::new().solve(&qubo).unwrap();
//!
//! let config = VariationalConfig::new(AnsatzKind::qaoa()).with_max_iterations(20);
//! let result = VariationalEngine::new(config).solve(&qubo).unwrap();
//! assert!(result.cost >= exact.cost);
//! ```

pub mod ansatz;
pub mod classical;
pub mod convergence;
pub mod engine;
pub mod error;
pub mod optimizers;
pub mod result;
pub mod statevector;

pub use ansatz::{AnsatzKind, AnsatzState, ParameterInit};
pub use classical::{BruteForce, DEFAULT_MAX_VARIABLES, Greedy};
pub use convergence::{ConvergencePolicy, StopReason};
pub use engine::{CancelFlag, VariationalConfig, VariationalEngine, derive_seed};
pub use error::{SolveError, SolveResult};
pub use optimizers::{Iterate, Optimizer, OptimizerKind};
pub use result::{Outcome, SolverKind, SolverResult, Trajectory, TrajectoryPoint};
pub use statevector::{Circuit, DEFAULT_MAX_QUBITS, Gate, HARD_MAX_QUBITS, StateVector};
