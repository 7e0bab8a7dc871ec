//! Tactical position selection.
//!
//! N candidate cover points each carry a risk cost Rᵢ and a distance cost Dᵢ.
//! Both vectors are normalised to [0, 1] and combined as `αR̂ᵢ + βD̂ᵢ`; the
//! selection of exactly `k` points is enforced with a penalty `P(Σ xᵢ − k)²`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::bitstring::Bitstring;
use crate::error::{QuboError, QuboResult};
use crate::qubo::{PenaltyConstraint, QuboBuilder, QuboInstance};

fn default_weight() -> f64 {
    1.0
}

fn default_penalty() -> f64 {
    10.0
}

fn default_select() -> usize {
    1
}

/// Scenario parameters for the tactical position problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticalScenario {
    /// Risk cost per position.
    pub risk_costs: Vec<f64>,
    /// Distance cost per position.
    pub distance_costs: Vec<f64>,
    /// Weight of the risk term.
    #[serde(default = "default_weight")]
    pub alpha: f64,
    /// Weight of the distance term.
    #[serde(default = "default_weight")]
    pub beta: f64,
    /// Penalty coefficient λ of the selection constraint.
    #[serde(default = "default_penalty")]
    pub penalty: f64,
    /// Number of positions to select.
    #[serde(default = "default_select")]
    pub select: usize,
    /// Pairs of positions that must not both be selected.
    #[serde(default)]
    pub exclusions: Vec<(usize, usize)>,
}

impl TacticalScenario {
    /// Scenario from explicit cost vectors, with α = β = 1, λ = 10, k = 1.
    pub fn new(risk_costs: Vec<f64>, distance_costs: Vec<f64>) -> Self {
        Self {
            risk_costs,
            distance_costs,
            alpha: default_weight(),
            beta: default_weight(),
            penalty: default_penalty(),
            select: default_select(),
            exclusions: Vec::new(),
        }
    }

    /// Scenario with costs drawn uniformly from [0.1, 1.0).
    pub fn random(n: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let risk: Vec<f64> = (0..n).map(|_| rng.gen_range(0.1..1.0)).collect();
        let distance: Vec<f64> = (0..n).map(|_| rng.gen_range(0.1..1.0)).collect();
        Self::new(risk, distance)
    }

    /// Set the objective weights.
    #[must_use]
    pub fn with_weights(mut self, alpha: f64, beta: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self
    }

    /// Set the penalty coefficient.
    #[must_use]
    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }

    /// Set how many positions must be selected.
    #[must_use]
    pub fn with_select(mut self, k: usize) -> Self {
        self.select = k;
        self
    }

    /// Forbid selecting both `i` and `j`.
    #[must_use]
    pub fn with_exclusion(mut self, i: usize, j: usize) -> Self {
        self.exclusions.push((i, j));
        self
    }

    /// Number of positions.
    pub fn n(&self) -> usize {
        self.risk_costs.len()
    }

    /// Check sizes and finiteness.
    pub fn validate(&self) -> QuboResult<()> {
        let n = self.n();
        if n < 1 {
            return Err(QuboError::invalid("scenario needs at least one position"));
        }
        if self.distance_costs.len() != n {
            return Err(QuboError::invalid(format!(
                "{} risk costs but {} distance costs",
                n,
                self.distance_costs.len()
            )));
        }
        if self
            .risk_costs
            .iter()
            .chain(&self.distance_costs)
            .any(|v| !v.is_finite())
        {
            return Err(QuboError::invalid("costs must be finite"));
        }
        if !self.alpha.is_finite() || !self.beta.is_finite() {
            return Err(QuboError::invalid("objective weights must be finite"));
        }
        if self.select > n {
            return Err(QuboError::invalid(format!(
                "cannot select {} of {n} positions",
                self.select
            )));
        }
        Ok(())
    }

    /// Combined per-position cost `αR̂ᵢ + βD̂ᵢ`.
    pub fn combined_costs(&self) -> Vec<f64> {
        let risk = normalize(&self.risk_costs);
        let distance = normalize(&self.distance_costs);
        risk.iter()
            .zip(&distance)
            .map(|(r, d)| self.alpha * r + self.beta * d)
            .collect()
    }

    /// Largest single-position objective magnitude.
    ///
    /// A penalty below this can make dropping or adding a selection cheaper
    /// than honouring the constraint.
    pub fn penalty_margin(&self) -> f64 {
        self.combined_costs()
            .iter()
            .fold(0.0_f64, |m, c| m.max(c.abs()))
    }

    /// Objective evaluated directly, without going through Q.
    pub fn objective(&self, x: &Bitstring) -> f64 {
        let linear: f64 = self
            .combined_costs()
            .iter()
            .enumerate()
            .map(|(i, c)| c * x.value(i))
            .sum();
        let violation = x.count_ones() as f64 - self.select as f64;
        let exclusions: f64 = self
            .exclusions
            .iter()
            .map(|&(i, j)| x.value(i) * x.value(j))
            .sum();
        linear + self.penalty * (violation * violation + exclusions)
    }

    /// True if `x` selects exactly `k` positions and no excluded pair.
    pub fn is_feasible(&self, x: &Bitstring) -> bool {
        x.count_ones() == self.select
            && self
                .exclusions
                .iter()
                .all(|&(i, j)| !(x.get(i) && x.get(j)))
    }

    /// Build the QUBO instance.
    pub fn build(&self) -> QuboResult<QuboInstance> {
        self.validate()?;

        let margin = self.penalty_margin();
        if self.penalty.is_finite() && self.penalty < margin {
            warn!(
                penalty = self.penalty,
                margin,
                "penalty below objective margin, infeasible assignments may win"
            );
        }

        let mut builder = QuboBuilder::new(self.n());
        for (i, c) in self.combined_costs().into_iter().enumerate() {
            builder = builder.linear(i, c);
        }
        builder = builder.constraint(PenaltyConstraint::cardinality(self.select, self.penalty));
        for &(i, j) in &self.exclusions {
            builder = builder.constraint(PenaltyConstraint::exclusion(i, j, self.penalty));
        }
        builder.build()
    }
}

/// Min-max normalisation to [0, 1]; a constant vector maps to `1/N` everywhere.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        let uniform = 1.0 / values.len() as f64;
        return vec![uniform; values.len()];
    }
    values.iter().map(|v| (v - min) / (max - min)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(&[1.0, 3.0, 2.0]), vec![0.0, 1.0, 0.5]);
        assert_eq!(normalize(&[0.4; 4]), vec![0.25; 4]);
    }

    #[test]
    fn test_random_is_seeded() {
        let a = TacticalScenario::random(6, 7);
        let b = TacticalScenario::random(6, 7);
        let c = TacticalScenario::random(6, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.risk_costs.iter().all(|v| (0.1..1.0).contains(v)));
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            TacticalScenario::new(vec![], vec![]).build(),
            Err(QuboError::InvalidScenario(_))
        ));
        assert!(matches!(
            TacticalScenario::new(vec![0.1, 0.2], vec![0.3]).build(),
            Err(QuboError::InvalidScenario(_))
        ));
        assert!(matches!(
            TacticalScenario::new(vec![0.1, f64::NAN], vec![0.3, 0.4]).build(),
            Err(QuboError::InvalidScenario(_))
        ));
        assert!(matches!(
            TacticalScenario::random(3, 1).with_select(4).build(),
            Err(QuboError::InvalidScenario(_))
        ));
        assert!(matches!(
            TacticalScenario::random(3, 1).with_penalty(-1.0).build(),
            Err(QuboError::InvalidScenario(_))
        ));
        assert!(matches!(
            TacticalScenario::random(3, 1).with_exclusion(0, 3).build(),
            Err(QuboError::VariableOutOfRange { index: 3, n: 3 })
        ));
    }

    #[test]
    fn test_build_matches_direct_objective() {
        let scenario = TacticalScenario::random(5, 42)
            .with_select(2)
            .with_exclusion(1, 3);
        let qubo = scenario.build().unwrap();
        for k in 0..(1 << 5) {
            let x = Bitstring::from_index(k, 5);
            assert!((qubo.evaluate(&x) - scenario.objective(&x)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_serde_defaults() {
        let json = r#"{"risk_costs":[0.1,0.5],"distance_costs":[0.2,0.3]}"#;
        let s: TacticalScenario = serde_json::from_str(json).unwrap();
        assert_eq!(s.alpha, 1.0);
        assert_eq!(s.penalty, 10.0);
        assert_eq!(s.select, 1);
        assert!(s.exclusions.is_empty());
    }
}
