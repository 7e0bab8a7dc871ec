//! `aegis-qubo`: QUBO problem model and Ising Hamiltonian builder.
//!
//! A QUBO instance minimises `xᵀQx + c` over binary `x`. This crate builds
//! instances from linear/pairwise terms and penalty-encoded constraints,
//! generates the tactical position-selection scenario, and converts any
//! instance to the equivalent diagonal Ising Hamiltonian
//! `Σ hᵢZᵢ + Σ JᵢⱼZᵢZⱼ + offset` consumed by the solvers.
//!
//! # Quick start
//!
//! ```rust
//! use aegis_qubo::{Bitstring, TacticalScenario, to_ising};
//!
//! // Pick 2 of 6 positions, penalty λ = 10.
//! let scenario = TacticalScenario::random(6, 42).with_select(2).with_penalty(10.0);
//! let qubo = scenario.build().unwrap();
//! let h = to_ising(&qubo).unwrap();
//!
//! let x: Bitstring = "110000".parse().unwrap();
//! assert!((h.energy(&x) - qubo.evaluate(&x)).abs() < 1e-9);
//! ```

pub mod bitstring;
pub mod error;
pub mod ising;
pub mod qubo;
pub mod scenario;

pub use bitstring::Bitstring;
pub use error::{QuboError, QuboResult};
pub use ising::{
    DEFAULT_SYMMETRY_TOLERANCE, IsingHamiltonian, IsingTerm, TermKind, to_ising,
    to_ising_with_tolerance,
};
pub use qubo::{PenaltyConstraint, QuboBuilder, QuboInstance};
pub use scenario::{TacticalScenario, normalize};
