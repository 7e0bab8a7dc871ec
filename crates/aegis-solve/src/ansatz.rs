//! Parameterized state-preparation circuits.
//!
//! Two families share one interface:
//!
//! - **HardwareEfficient** (VQE-style): an Ry layer followed by `reps` ×
//!   (linear CX chain, Ry layer). `N·(reps+1)` parameters.
//! - **Qaoa** (alternating operator): `|+⟩^N`, then per layer the cost
//!   unitary `exp(−iγH)` and the mixer `Rx(2β)` on every qubit. Parameters
//!   are laid out `[γ₁…γ_p, β₁…β_p]`.

use std::f64::consts::PI;

use aegis_qubo::{IsingHamiltonian, TermKind};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SolveError, SolveResult};
use crate::statevector::{Circuit, StateVector};

/// Ansatz family and depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnsatzKind {
    /// RealAmplitudes-style Ry/CX ansatz.
    HardwareEfficient {
        /// Entangling repetitions.
        reps: usize,
    },
    /// QAOA with `layers` cost/mixer rounds.
    Qaoa {
        /// Number of layers p.
        layers: usize,
    },
}

impl AnsatzKind {
    /// VQE default: 2 repetitions.
    pub fn vqe() -> Self {
        AnsatzKind::HardwareEfficient { reps: 2 }
    }

    /// QAOA default: 2 layers.
    pub fn qaoa() -> Self {
        AnsatzKind::Qaoa { layers: 2 }
    }

    /// Short family name.
    pub fn name(&self) -> &'static str {
        match self {
            AnsatzKind::HardwareEfficient { .. } => "vqe",
            AnsatzKind::Qaoa { .. } => "qaoa",
        }
    }

    /// Parameter count for an `n`-qubit problem.
    pub fn num_parameters(&self, n_qubits: usize) -> usize {
        match *self {
            AnsatzKind::HardwareEfficient { reps } => n_qubits * (reps + 1),
            AnsatzKind::Qaoa { layers } => 2 * layers,
        }
    }

    /// Build the circuit for `params`.
    pub fn circuit(&self, hamiltonian: &IsingHamiltonian, params: &[f64]) -> SolveResult<Circuit> {
        let n = hamiltonian.n();
        let expected = self.num_parameters(n);
        if params.len() != expected {
            return Err(SolveError::ParameterMismatch {
                expected,
                got: params.len(),
            });
        }

        let mut circuit = Circuit::new(n);
        match *self {
            AnsatzKind::HardwareEfficient { reps } => {
                let mut theta = params.iter();
                for q in 0..n {
                    circuit.ry(*theta.next().unwrap_or(&0.0), q);
                }
                for _ in 0..reps {
                    for q in 0..n.saturating_sub(1) {
                        circuit.cx(q, q + 1);
                    }
                    for q in 0..n {
                        circuit.ry(*theta.next().unwrap_or(&0.0), q);
                    }
                }
            }
            AnsatzKind::Qaoa { layers } => {
                let (gammas, betas) = params.split_at(layers);
                for q in 0..n {
                    circuit.h(q);
                }
                for (gamma, beta) in gammas.iter().zip(betas) {
                    for term in hamiltonian.terms() {
                        let angle = 2.0 * gamma * term.coeff;
                        match (term.kind, term.support()) {
                            (TermKind::Z, [q]) => {
                                circuit.rz(angle, *q);
                            }
                            (TermKind::ZZ, [a, b]) => {
                                circuit.cx(*a, *b).rz(angle, *b).cx(*a, *b);
                            }
                            _ => {}
                        }
                    }
                    for q in 0..n {
                        circuit.rx(2.0 * beta, q);
                    }
                }
            }
        }
        Ok(circuit)
    }

    /// Simulate the ansatz state `|ψ(θ)⟩`.
    pub fn prepare_state(
        &self,
        hamiltonian: &IsingHamiltonian,
        params: &[f64],
        max_qubits: usize,
    ) -> SolveResult<StateVector> {
        let circuit = self.circuit(hamiltonian, params)?;
        StateVector::simulate(&circuit, max_qubits)
    }

    /// The family's preferred starting point.
    ///
    /// Uniform in [−π, π) for the hardware-efficient ansatz; a trotterized
    /// adiabatic schedule for QAOA.
    pub fn default_parameters<R: Rng>(&self, n_qubits: usize, rng: &mut R) -> Vec<f64> {
        match *self {
            AnsatzKind::HardwareEfficient { .. } => (0..self.num_parameters(n_qubits))
                .map(|_| rng.gen_range(-PI..PI))
                .collect(),
            AnsatzKind::Qaoa { layers } => {
                let dt = 1.0 / (layers + 1) as f64;
                let schedule: Vec<f64> = (1..=layers).map(|i| i as f64 * dt).collect();
                schedule
                    .iter()
                    .map(|s| s * PI / 2.0 * dt)
                    .chain(schedule.iter().map(|s| (1.0 - s) * PI / 2.0 * dt))
                    .collect()
            }
        }
    }
}

impl std::fmt::Display for AnsatzKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnsatzKind::HardwareEfficient { reps } => write!(f, "vqe(reps={reps})"),
            AnsatzKind::Qaoa { layers } => write!(f, "qaoa(p={layers})"),
        }
    }
}

/// How the first θ is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterInit {
    /// All zeros.
    Zeros,
    /// Uniform in `[low, high)`.
    Uniform {
        /// Lower bound.
        low: f64,
        /// Upper bound (exclusive).
        high: f64,
    },
    /// The ansatz family's default.
    #[default]
    Ansatz,
}

impl ParameterInit {
    /// Draw an initial parameter vector.
    pub fn initial<R: Rng>(
        &self,
        ansatz: &AnsatzKind,
        n_qubits: usize,
        rng: &mut R,
    ) -> SolveResult<Vec<f64>> {
        let dim = ansatz.num_parameters(n_qubits);
        match *self {
            ParameterInit::Zeros => Ok(vec![0.0; dim]),
            ParameterInit::Uniform { low, high } => {
                if !(low.is_finite() && high.is_finite() && low < high) {
                    return Err(SolveError::InvalidConfig(format!(
                        "uniform initialisation needs finite low < high, got [{low}, {high})"
                    )));
                }
                Ok((0..dim).map(|_| rng.gen_range(low..high)).collect())
            }
            ParameterInit::Ansatz => Ok(ansatz.default_parameters(n_qubits, rng)),
        }
    }
}

/// θ plus its ansatz tag, owned by one engine run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnsatzState {
    kind: AnsatzKind,
    n_qubits: usize,
    params: Vec<f64>,
}

impl AnsatzState {
    /// Wrap `params`, checking the dimension.
    pub fn new(kind: AnsatzKind, n_qubits: usize, params: Vec<f64>) -> SolveResult<Self> {
        check_dimension(&kind, n_qubits, &params)?;
        Ok(Self {
            kind,
            n_qubits,
            params,
        })
    }

    /// Ansatz tag.
    pub fn kind(&self) -> AnsatzKind {
        self.kind
    }

    /// Current θ.
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Replace θ.
    pub fn set_params(&mut self, params: Vec<f64>) -> SolveResult<()> {
        check_dimension(&self.kind, self.n_qubits, &params)?;
        self.params = params;
        Ok(())
    }
}

fn check_dimension(kind: &AnsatzKind, n_qubits: usize, params: &[f64]) -> SolveResult<()> {
    let expected = kind.num_parameters(n_qubits);
    if params.len() != expected {
        return Err(SolveError::ParameterMismatch {
            expected,
            got: params.len(),
        });
    }
    Ok(())
}
