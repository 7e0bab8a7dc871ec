//! Ising form of a QUBO instance.
//!
//! Substituting `xᵢ = (1 − zᵢ)/2` with spins `zᵢ ∈ {−1, +1}` turns the
//! quadratic form into
//!
//!   H = Σᵢ hᵢ Zᵢ + Σ_{i<j} Jᵢⱼ ZᵢZⱼ + offset
//!
//! whose eigenvalue on basis state `|x⟩` equals the QUBO cost of `x`.
//! A qubit in `|0⟩` has `⟨Z⟩ = +1`, so bit value 0 maps to spin +1.
//!
//! # Example
//!
//! ```rust
//! use aegis_qubo::{Bitstring, QuboBuilder, to_ising};
//!
//! let qubo = QuboBuilder::new(2).linear(0, -1.0).quadratic(0, 1, 2.0).build().unwrap();
//! let h = to_ising(&qubo).unwrap();
//! let x: Bitstring = "11".parse().unwrap();
//! assert!((h.energy(&x) - qubo.evaluate(&x)).abs() < 1e-12);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bitstring::Bitstring;
use crate::error::{QuboError, QuboResult};
use crate::qubo::QuboInstance;

/// Relative tolerance used by [`to_ising`] for the symmetry check.
pub const DEFAULT_SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Operator kind of an Ising term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermKind {
    /// Single-spin `Zᵢ`.
    Z,
    /// Two-spin coupling `ZᵢZⱼ`.
    ZZ,
}

/// A single weighted term `coeff · Π_{i∈support} Zᵢ`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsingTerm {
    /// Real coefficient.
    pub coeff: f64,
    /// Operator kind.
    pub kind: TermKind,
    support: Vec<usize>,
}

impl IsingTerm {
    /// Shorthand: single-spin Z term.
    pub fn z(qubit: usize, coeff: f64) -> Self {
        Self {
            coeff,
            kind: TermKind::Z,
            support: vec![qubit],
        }
    }

    /// Shorthand: ZZ coupling term. The support is stored sorted.
    pub fn zz(q0: usize, q1: usize, coeff: f64) -> Self {
        Self {
            coeff,
            kind: TermKind::ZZ,
            support: vec![q0.min(q1), q0.max(q1)],
        }
    }

    /// Spin indices, ascending.
    pub fn support(&self) -> &[usize] {
        &self.support
    }

    /// Number of spins the term acts on.
    pub fn weight(&self) -> usize {
        self.support.len()
    }

    /// Basis-index mask of the support.
    ///
    /// Only meaningful for spins below `usize::BITS`, the most a basis index
    /// can address.
    pub fn mask(&self) -> usize {
        self.support.iter().fold(0, |m, q| m | (1 << q))
    }
}

/// Diagonal Ising Hamiltonian over `n` spins.
///
/// Terms are ordered by support, lexicographically ascending, so two builds
/// from the same QUBO yield identical sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsingHamiltonian {
    n: usize,
    terms: Vec<IsingTerm>,
    offset: f64,
}

impl IsingHamiltonian {
    /// Number of spins.
    pub fn n(&self) -> usize {
        self.n
    }

    /// All terms in support order.
    pub fn terms(&self) -> &[IsingTerm] {
        &self.terms
    }

    /// Number of terms.
    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    /// The identity coefficient.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Σ |cₖ| over the non-identity terms.
    pub fn lambda(&self) -> f64 {
        self.terms.iter().map(|t| t.coeff.abs()).sum()
    }

    /// Energy of a classical spin configuration given as bits.
    ///
    /// # Panics
    /// Panics if `x` is shorter than the number of spins.
    pub fn energy(&self, x: &Bitstring) -> f64 {
        let spin = |i: usize| if x.get(i) { -1.0 } else { 1.0 };
        self.offset
            + self
                .terms
                .iter()
                .map(|t| t.coeff * t.support.iter().map(|&q| spin(q)).product::<f64>())
                .sum::<f64>()
    }

    /// Energy of every basis state, indexed little-endian.
    ///
    /// `None` when `2^n` basis states cannot be indexed by a `usize`.
    pub fn diagonal(&self) -> Option<Vec<f64>> {
        let dim = 1usize.checked_shl(u32::try_from(self.n).ok()?)?;
        let masks: Vec<(usize, f64)> = self.terms.iter().map(|t| (t.mask(), t.coeff)).collect();
        let diag = (0..dim)
            .map(|k| {
                masks.iter().fold(self.offset, |acc, &(mask, c)| {
                    if (k & mask).count_ones() % 2 == 0 {
                        acc + c
                    } else {
                        acc - c
                    }
                })
            })
            .collect();
        Some(diag)
    }
}

/// Convert a QUBO instance to Ising form with the default symmetry tolerance.
pub fn to_ising(qubo: &QuboInstance) -> QuboResult<IsingHamiltonian> {
    to_ising_with_tolerance(qubo, DEFAULT_SYMMETRY_TOLERANCE)
}

/// Convert a QUBO instance to Ising form.
///
/// `Q[i][j]` and `Q[j][i]` must agree to within `tolerance · max(1, |Q[i][j]|, |Q[j][i]|)`.
pub fn to_ising_with_tolerance(
    qubo: &QuboInstance,
    tolerance: f64,
) -> QuboResult<IsingHamiltonian> {
    let n = qubo.n();
    let q = qubo.matrix();

    for i in 0..n {
        for j in (i + 1)..n {
            let (upper, lower) = (q[[i, j]], q[[j, i]]);
            let scale = 1.0_f64.max(upper.abs()).max(lower.abs());
            if (upper - lower).abs() > tolerance * scale {
                return Err(QuboError::InconsistentMatrix {
                    row: i,
                    col: j,
                    upper,
                    lower,
                });
            }
        }
    }

    let mut collected: BTreeMap<Vec<usize>, f64> = BTreeMap::new();
    let mut offset = qubo.offset();

    for i in 0..n {
        let d = q[[i, i]];
        offset += d / 2.0;
        *collected.entry(vec![i]).or_insert(0.0) -= d / 2.0;
    }
    for i in 0..n {
        for j in (i + 1)..n {
            // weight of xᵢxⱼ in the cost
            let w = q[[i, j]] + q[[j, i]];
            if w == 0.0 {
                continue;
            }
            let quarter = w / 4.0;
            offset += quarter;
            *collected.entry(vec![i]).or_insert(0.0) -= quarter;
            *collected.entry(vec![j]).or_insert(0.0) -= quarter;
            *collected.entry(vec![i, j]).or_insert(0.0) += quarter;
        }
    }

    let terms: Vec<IsingTerm> = collected
        .into_iter()
        .filter(|(_, c)| *c != 0.0)
        .map(|(support, coeff)| match support.as_slice() {
            [i] => IsingTerm::z(*i, coeff),
            [i, j] => IsingTerm::zz(*i, *j, coeff),
            _ => unreachable!("supports have one or two spins"),
        })
        .collect();

    debug!(n, n_terms = terms.len(), offset, "built Ising Hamiltonian");

    Ok(IsingHamiltonian { n, terms, offset })
}
