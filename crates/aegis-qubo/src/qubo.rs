//! QUBO instances and the penalty method.
//!
//! A QUBO instance minimises
//!
//!   C(x) = xᵀ Q x + c,   x ∈ {0,1}ᴺ
//!
//! with Q stored symmetrically: a pairwise weight `w` on `xᵢxⱼ` appears as
//! `w/2` in both `Q[i][j]` and `Q[j][i]`. Because `xᵢ² = xᵢ`, the diagonal
//! carries the linear part.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::bitstring::Bitstring;
use crate::error::{QuboError, QuboResult};

/// A constraint folded into Q as a penalty term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PenaltyConstraint {
    /// `Σ aᵢxᵢ = target`, penalised as `λ(Σ aᵢxᵢ − target)²`.
    Equality {
        /// One coefficient per variable.
        coefficients: Vec<f64>,
        /// Right-hand side.
        target: f64,
        /// Penalty coefficient λ.
        lambda: f64,
    },
    /// `Σ xᵢ = k`, penalised as `λ(Σ xᵢ − k)²`.
    Cardinality {
        /// Number of variables that must be set.
        k: usize,
        /// Penalty coefficient λ.
        lambda: f64,
    },
    /// `xᵢ` and `xⱼ` must not both be set, penalised as `λ·xᵢxⱼ`.
    Exclusion {
        /// First variable.
        i: usize,
        /// Second variable.
        j: usize,
        /// Penalty coefficient λ.
        lambda: f64,
    },
}

impl PenaltyConstraint {
    /// Shorthand for an equality constraint.
    pub fn equality(coefficients: Vec<f64>, target: f64, lambda: f64) -> Self {
        PenaltyConstraint::Equality {
            coefficients,
            target,
            lambda,
        }
    }

    /// Shorthand for `Σ xᵢ = k`.
    pub fn cardinality(k: usize, lambda: f64) -> Self {
        PenaltyConstraint::Cardinality { k, lambda }
    }

    /// Shorthand for "not both `i` and `j`".
    pub fn exclusion(i: usize, j: usize, lambda: f64) -> Self {
        PenaltyConstraint::Exclusion { i, j, lambda }
    }

    /// The penalty coefficient λ.
    pub fn lambda(&self) -> f64 {
        match self {
            PenaltyConstraint::Equality { lambda, .. }
            | PenaltyConstraint::Cardinality { lambda, .. }
            | PenaltyConstraint::Exclusion { lambda, .. } => *lambda,
        }
    }

    /// Check the constraint against an `n`-variable problem.
    pub fn validate(&self, n: usize) -> QuboResult<()> {
        let lambda = self.lambda();
        if !lambda.is_finite() {
            return Err(QuboError::invalid(format!(
                "penalty coefficient must be finite, got {lambda}"
            )));
        }
        if lambda < 0.0 {
            return Err(QuboError::invalid(format!(
                "penalty coefficient must be non-negative, got {lambda}"
            )));
        }
        match self {
            PenaltyConstraint::Equality {
                coefficients,
                target,
                ..
            } => {
                if coefficients.len() != n {
                    return Err(QuboError::invalid(format!(
                        "equality constraint has {} coefficients for {n} variables",
                        coefficients.len()
                    )));
                }
                if coefficients.iter().any(|a| !a.is_finite()) || !target.is_finite() {
                    return Err(QuboError::invalid(
                        "equality constraint has non-finite coefficients",
                    ));
                }
            }
            PenaltyConstraint::Cardinality { k, .. } => {
                if *k > n {
                    return Err(QuboError::invalid(format!(
                        "cannot select {k} of {n} variables"
                    )));
                }
            }
            PenaltyConstraint::Exclusion { i, j, .. } => {
                for &index in [i, j] {
                    if index >= n {
                        return Err(QuboError::VariableOutOfRange { index, n });
                    }
                }
                if i == j {
                    return Err(QuboError::invalid(format!(
                        "exclusion pair must name two distinct variables, got ({i}, {j})"
                    )));
                }
            }
        }
        Ok(())
    }

    /// True if `x` satisfies the constraint exactly.
    pub fn is_satisfied(&self, x: &Bitstring) -> bool {
        self.residual(x).abs() < 1e-9
    }

    /// Signed violation: `Σ aᵢxᵢ − target` for equalities, `xᵢxⱼ` for exclusions.
    pub fn residual(&self, x: &Bitstring) -> f64 {
        match self {
            PenaltyConstraint::Equality {
                coefficients,
                target,
                ..
            } => {
                coefficients
                    .iter()
                    .enumerate()
                    .map(|(i, a)| a * x.value(i))
                    .sum::<f64>()
                    - target
            }
            PenaltyConstraint::Cardinality { k, .. } => x.count_ones() as f64 - *k as f64,
            PenaltyConstraint::Exclusion { i, j, .. } => x.value(*i) * x.value(*j),
        }
    }

    /// Fold the expanded penalty into `q` and `offset`.
    fn apply(&self, q: &mut Array2<f64>, offset: &mut f64) {
        let n = q.nrows();
        match self {
            PenaltyConstraint::Equality {
                coefficients,
                target,
                lambda,
            } => fold_square(q, offset, coefficients, *target, *lambda),
            PenaltyConstraint::Cardinality { k, lambda } => {
                fold_square(q, offset, &vec![1.0; n], *k as f64, *lambda);
            }
            PenaltyConstraint::Exclusion { i, j, lambda } => {
                q[[*i, *j]] += lambda / 2.0;
                q[[*j, *i]] += lambda / 2.0;
            }
        }
    }
}

/// λ(Σ aᵢxᵢ − k)² = Σᵢ λ(aᵢ² − 2k·aᵢ)xᵢ + Σ_{i<j} 2λ·aᵢaⱼ·xᵢxⱼ + λk²
fn fold_square(q: &mut Array2<f64>, offset: &mut f64, a: &[f64], k: f64, lambda: f64) {
    let n = a.len();
    for i in 0..n {
        q[[i, i]] += lambda * (a[i] * a[i] - 2.0 * k * a[i]);
        for j in (i + 1)..n {
            let half = lambda * a[i] * a[j];
            q[[i, j]] += half;
            q[[j, i]] += half;
        }
    }
    *offset += lambda * k * k;
}

/// An immutable QUBO instance.
#[derive(Debug, Clone, PartialEq)]
pub struct QuboInstance {
    q: Array2<f64>,
    offset: f64,
}

impl QuboInstance {
    /// Wrap a cost matrix and offset.
    ///
    /// The matrix must be square with at least one row and finite entries.
    /// Symmetry is checked later by the Hamiltonian builder.
    pub fn new(q: Array2<f64>, offset: f64) -> QuboResult<Self> {
        if !q.is_square() {
            return Err(QuboError::invalid(format!(
                "cost matrix must be square, got {}x{}",
                q.nrows(),
                q.ncols()
            )));
        }
        if q.nrows() == 0 {
            return Err(QuboError::invalid("problem must have at least one variable"));
        }
        if q.iter().any(|v| !v.is_finite()) || !offset.is_finite() {
            return Err(QuboError::invalid("cost matrix contains non-finite entries"));
        }
        Ok(Self { q, offset })
    }

    /// Build from row vectors.
    pub fn from_rows(rows: Vec<Vec<f64>>, offset: f64) -> QuboResult<Self> {
        let n = rows.len();
        if rows.iter().any(|r| r.len() != n) {
            return Err(QuboError::invalid("cost matrix rows must all have length N"));
        }
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let q = Array2::from_shape_vec((n, n), flat)
            .map_err(|e| QuboError::invalid(format!("cost matrix shape: {e}")))?;
        Self::new(q, offset)
    }

    /// Number of binary variables N.
    pub fn n(&self) -> usize {
        self.q.nrows()
    }

    /// The cost matrix.
    pub fn matrix(&self) -> &Array2<f64> {
        &self.q
    }

    /// The constant offset.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Cost `xᵀQx + offset`, checking the assignment length.
    pub fn cost(&self, x: &Bitstring) -> QuboResult<f64> {
        if x.len() != self.n() {
            return Err(QuboError::SizeMismatch {
                expected: self.n(),
                got: x.len(),
            });
        }
        Ok(self.evaluate(x))
    }

    /// Cost `xᵀQx + offset`.
    ///
    /// # Panics
    /// Panics if `x` is shorter than N.
    pub fn evaluate(&self, x: &Bitstring) -> f64 {
        let ones = x.ones_indices();
        let mut total = self.offset;
        for &i in &ones {
            for &j in &ones {
                total += self.q[[i, j]];
            }
        }
        total
    }

    /// Change in cost when flipping bit `i` of `x`.
    ///
    /// # Panics
    /// Panics if `x` is shorter than N or `i >= N`.
    pub fn flip_delta(&self, x: &Bitstring, i: usize) -> f64 {
        let direction = if x.get(i) { -1.0 } else { 1.0 };
        let mut field = self.q[[i, i]];
        for j in 0..self.n() {
            if j != i && x.get(j) {
                field += self.q[[i, j]] + self.q[[j, i]];
            }
        }
        direction * field
    }
}

/// Incremental builder for QUBO instances.
///
/// ```rust
/// use aegis_qubo::{PenaltyConstraint, QuboBuilder};
///
/// // minimise −x₀ − x₁ subject to x₀ + x₁ = 1
/// let qubo = QuboBuilder::new(2)
///     .linear(0, -1.0)
///     .linear(1, -1.0)
///     .constraint(PenaltyConstraint::cardinality(1, 10.0))
///     .build()
///     .unwrap();
/// assert_eq!(qubo.n(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct QuboBuilder {
    n: usize,
    linear: Vec<(usize, f64)>,
    pairs: Vec<(usize, usize, f64)>,
    offset: f64,
    constraints: Vec<PenaltyConstraint>,
}

impl QuboBuilder {
    /// Start an `n`-variable problem with zero cost.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            linear: Vec::new(),
            pairs: Vec::new(),
            offset: 0.0,
            constraints: Vec::new(),
        }
    }

    /// Add `c·xᵢ`.
    #[must_use]
    pub fn linear(mut self, i: usize, c: f64) -> Self {
        self.linear.push((i, c));
        self
    }

    /// Add `w·xᵢxⱼ`. With `i == j` this is the linear term `w·xᵢ`.
    #[must_use]
    pub fn quadratic(mut self, i: usize, j: usize, w: f64) -> Self {
        if i == j {
            self.linear.push((i, w));
        } else {
            self.pairs.push((i, j, w));
        }
        self
    }

    /// Add a constant.
    #[must_use]
    pub fn offset(mut self, c: f64) -> Self {
        self.offset += c;
        self
    }

    /// Add a penalty-encoded constraint.
    #[must_use]
    pub fn constraint(mut self, constraint: PenaltyConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Validate everything and fold the constraints into Q.
    pub fn build(self) -> QuboResult<QuboInstance> {
        let n = self.n;
        if n < 1 {
            return Err(QuboError::invalid("problem must have at least one variable"));
        }
        if !self.offset.is_finite() {
            return Err(QuboError::invalid("offset must be finite"));
        }

        let mut q = Array2::<f64>::zeros((n, n));
        let mut offset = self.offset;

        for (i, c) in self.linear {
            check_index(i, n)?;
            check_finite(c, "linear coefficient")?;
            q[[i, i]] += c;
        }
        for (i, j, w) in self.pairs {
            check_index(i, n)?;
            check_index(j, n)?;
            check_finite(w, "pairwise coefficient")?;
            q[[i, j]] += w / 2.0;
            q[[j, i]] += w / 2.0;
        }
        for constraint in &self.constraints {
            constraint.validate(n)?;
            constraint.apply(&mut q, &mut offset);
        }

        QuboInstance::new(q, offset)
    }
}

fn check_index(index: usize, n: usize) -> QuboResult<()> {
    if index >= n {
        return Err(QuboError::VariableOutOfRange { index, n });
    }
    Ok(())
}

fn check_finite(value: f64, what: &str) -> QuboResult<()> {
    if !value.is_finite() {
        return Err(QuboError::invalid(format!("{what} must be finite, got {value}")));
    }
    Ok(())
}
