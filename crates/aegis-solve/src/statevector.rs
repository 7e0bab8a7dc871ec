//! Dense statevector simulation.
//!
//! Basis index bit `q` is qubit `q` (little-endian), matching
//! [`aegis_qubo::Bitstring::from_index`].

use num_complex::Complex64;

use crate::error::{SolveError, SolveResult};

/// Default ceiling on simulated qubits.
pub const DEFAULT_MAX_QUBITS: usize = 20;

/// Largest register whose basis indices fit in a `usize`.
pub const HARD_MAX_QUBITS: usize = usize::BITS as usize - 1;

/// Gates supported by the simulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// Hadamard.
    H(usize),
    /// X rotation `exp(−iθX/2)`.
    Rx(usize, f64),
    /// Y rotation `exp(−iθY/2)`.
    Ry(usize, f64),
    /// Z rotation `diag(e^{−iθ/2}, e^{iθ/2})`.
    Rz(usize, f64),
    /// Controlled-X.
    Cx {
        /// Control qubit.
        control: usize,
        /// Target qubit.
        target: usize,
    },
}

impl Gate {
    fn max_qubit(&self) -> usize {
        match *self {
            Gate::H(q) | Gate::Rx(q, _) | Gate::Ry(q, _) | Gate::Rz(q, _) => q,
            Gate::Cx { control, target } => control.max(target),
        }
    }
}

/// An ordered gate list over a fixed register.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Circuit {
    n_qubits: usize,
    gates: Vec<Gate>,
}

impl Circuit {
    /// Empty circuit on `n_qubits` qubits.
    pub fn new(n_qubits: usize) -> Self {
        Self {
            n_qubits,
            gates: Vec::new(),
        }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.n_qubits
    }

    /// Gates in application order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Append a gate.
    pub fn push(&mut self, gate: Gate) -> &mut Self {
        debug_assert!(gate.max_qubit() < self.n_qubits);
        self.gates.push(gate);
        self
    }

    pub fn h(&mut self, q: usize) -> &mut Self {
        self.push(Gate::H(q))
    }

    pub fn rx(&mut self, theta: f64, q: usize) -> &mut Self {
        self.push(Gate::Rx(q, theta))
    }

    pub fn ry(&mut self, theta: f64, q: usize) -> &mut Self {
        self.push(Gate::Ry(q, theta))
    }

    pub fn rz(&mut self, theta: f64, q: usize) -> &mut Self {
        self.push(Gate::Rz(q, theta))
    }

    pub fn cx(&mut self, control: usize, target: usize) -> &mut Self {
        self.push(Gate::Cx { control, target })
    }
}

/// Amplitudes of an `n`-qubit pure state.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    n_qubits: usize,
    amplitudes: Vec<Complex64>,
}

impl StateVector {
    /// `|0…0⟩` on `n_qubits` qubits, refusing registers above `max_qubits`
    /// (itself capped at [`HARD_MAX_QUBITS`]).
    pub fn zero(n_qubits: usize, max_qubits: usize) -> SolveResult<Self> {
        let limit = max_qubits.min(HARD_MAX_QUBITS);
        if n_qubits > limit {
            return Err(SolveError::IntractableSize {
                solver: "statevector",
                n: n_qubits,
                limit,
            });
        }
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << n_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self {
            n_qubits,
            amplitudes,
        })
    }

    /// Run `circuit` from `|0…0⟩`.
    pub fn simulate(circuit: &Circuit, max_qubits: usize) -> SolveResult<Self> {
        let mut state = Self::zero(circuit.num_qubits(), max_qubits)?;
        for gate in circuit.gates() {
            state.apply(gate);
        }
        Ok(state)
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.n_qubits
    }

    /// Raw amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Basis-state probabilities `|⟨k|ψ⟩|²`.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// `⟨ψ|ψ⟩`.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }

    /// Apply one gate in place.
    pub fn apply(&mut self, gate: &Gate) {
        let state = &mut self.amplitudes;
        match *gate {
            Gate::H(q) => {
                let h = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
                for_pairs(state.len(), q, |i, j| {
                    let (a, b) = (state[i], state[j]);
                    state[i] = h * (a + b);
                    state[j] = h * (a - b);
                });
            }
            Gate::Rx(q, theta) => {
                let c = Complex64::new((theta / 2.0).cos(), 0.0);
                let s = Complex64::new(0.0, -(theta / 2.0).sin());
                for_pairs(state.len(), q, |i, j| {
                    let (a, b) = (state[i], state[j]);
                    state[i] = c * a + s * b;
                    state[j] = s * a + c * b;
                });
            }
            Gate::Ry(q, theta) => {
                let c = (theta / 2.0).cos();
                let s = (theta / 2.0).sin();
                for_pairs(state.len(), q, |i, j| {
                    let (a, b) = (state[i], state[j]);
                    state[i] = a * c - b * s;
                    state[j] = a * s + b * c;
                });
            }
            Gate::Rz(q, theta) => {
                let phase0 = Complex64::from_polar(1.0, -theta / 2.0);
                let phase1 = Complex64::from_polar(1.0, theta / 2.0);
                for (i, amp) in state.iter_mut().enumerate() {
                    *amp *= if (i >> q) & 1 == 0 { phase0 } else { phase1 };
                }
            }
            Gate::Cx { control, target } => {
                for i in 0..state.len() {
                    if (i >> control) & 1 == 1 && (i >> target) & 1 == 0 {
                        state.swap(i, i | (1 << target));
                    }
                }
            }
        }
    }
}

/// Visit every index pair `(i, i | 1<<q)` with bit `q` of `i` clear.
fn for_pairs(dim: usize, q: usize, mut f: impl FnMut(usize, usize)) {
    let bit = 1 << q;
    for i in 0..dim {
        if i & bit == 0 {
            f(i, i | bit);
        }
    }
}

/// `⟨Z_S⟩ = Σₖ pₖ·(−1)^{popcount(k & mask)}`
pub fn z_expectation(probs: &[f64], mask: usize) -> f64 {
    probs
        .iter()
        .enumerate()
        .map(|(k, p)| {
            if (k & mask).count_ones() % 2 == 0 {
                *p
            } else {
                -*p
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_hadamard_uniform() {
        let mut c = Circuit::new(2);
        c.h(0).h(1);
        let sv = StateVector::simulate(&c, DEFAULT_MAX_QUBITS).unwrap();
        for p in sv.probabilities() {
            assert!(approx(p, 0.25));
        }
    }

    #[test]
    fn test_bell_state() {
        let mut c = Circuit::new(2);
        c.h(0).cx(0, 1);
        let probs = StateVector::simulate(&c, DEFAULT_MAX_QUBITS)
            .unwrap()
            .probabilities();
        assert!(approx(probs[0b00], 0.5));
        assert!(approx(probs[0b11], 0.5));
        assert!(approx(z_expectation(&probs, 0b11), 1.0));
        assert!(approx(z_expectation(&probs, 0b01), 0.0));
    }

    #[test]
    fn test_ry_pi_flips() {
        let mut c = Circuit::new(3);
        c.ry(PI, 1);
        let probs = StateVector::simulate(&c, DEFAULT_MAX_QUBITS)
            .unwrap()
            .probabilities();
        assert!(approx(probs[0b010], 1.0));
        assert!(approx(z_expectation(&probs, 0b010), -1.0));
    }

    #[test]
    fn test_rx_matches_ry_populations() {
        let mut a = Circuit::new(1);
        a.rx(0.7, 0);
        let mut b = Circuit::new(1);
        b.ry(0.7, 0);
        let pa = StateVector::simulate(&a, 4).unwrap().probabilities();
        let pb = StateVector::simulate(&b, 4).unwrap().probabilities();
        assert!(approx(pa[1], pb[1]));
    }

    #[test]
    fn test_rz_preserves_populations() {
        let mut c = Circuit::new(2);
        c.h(0).h(1).rz(1.3, 0).rz(-0.4, 1);
        let sv = StateVector::simulate(&c, DEFAULT_MAX_QUBITS).unwrap();
        assert!(approx(sv.norm_sqr(), 1.0));
        for p in sv.probabilities() {
            assert!(approx(p, 0.25));
        }
    }

    #[test]
    fn test_apply_single_gate() {
        let mut sv = StateVector::zero(2, 4).unwrap();
        sv.apply(&Gate::Ry(1, PI));
        assert!(approx(sv.probabilities()[0b10], 1.0));
    }

    #[test]
    fn test_qubit_ceiling() {
        assert!(matches!(
            StateVector::zero(5, 4),
            Err(SolveError::IntractableSize { n: 5, limit: 4, .. })
        ));
        // an oversized limit still cannot address 2^64 amplitudes
        assert!(matches!(
            StateVector::zero(64, usize::MAX),
            Err(SolveError::IntractableSize { n: 64, limit: 63, .. })
        ));
    }
}
