//! Simultaneous perturbation stochastic approximation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Iterate, Objective, Optimizer};
use crate::error::SolveResult;

/// SPSA with gains `a_k = a/(k+1+A)^α` and `c_k = c/(k+1)^γ`.
///
/// Each step costs three evaluations: θ ± c_k·Δ for the gradient estimate
/// and the updated θ itself.
#[derive(Debug, Clone)]
pub struct Spsa {
    a: f64,
    c: f64,
    alpha: f64,
    gamma: f64,
    stability: f64,
    k: usize,
    rng: StdRng,
}

impl Spsa {
    pub fn new(a: f64, c: f64, alpha: f64, gamma: f64, stability: f64, seed: u64) -> Self {
        Self {
            a,
            c,
            alpha,
            gamma,
            stability,
            k: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Step size and perturbation size at step `k` (0-based).
    pub fn gains(&self, k: usize) -> (f64, f64) {
        let a_k = self.a / (k as f64 + 1.0 + self.stability).powf(self.alpha);
        let c_k = self.c / (k as f64 + 1.0).powf(self.gamma);
        (a_k, c_k)
    }

    /// Steps taken so far.
    pub fn steps(&self) -> usize {
        self.k
    }
}

impl Optimizer for Spsa {
    fn name(&self) -> &'static str {
        "spsa"
    }

    fn step(&mut self, current: &Iterate, objective: &mut Objective<'_>) -> SolveResult<Iterate> {
        let (a_k, c_k) = self.gains(self.k);
        let delta: Vec<f64> = (0..current.params.len())
            .map(|_| if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 })
            .collect();

        let shifted = |sign: f64| -> Vec<f64> {
            current
                .params
                .iter()
                .zip(&delta)
                .map(|(x, d)| x + sign * c_k * d)
                .collect()
        };
        let f_plus = objective(&shifted(1.0))?;
        let f_minus = objective(&shifted(-1.0))?;

        let diff = f_plus - f_minus;
        let params: Vec<f64> = current
            .params
            .iter()
            .zip(&delta)
            .map(|(x, d)| x - a_k * diff / (2.0 * c_k * d))
            .collect();
        let energy = objective(&params)?;
        self.k += 1;

        Ok(Iterate { params, energy })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizers::test_support::run;

    #[test]
    fn test_gains_decay() {
        let spsa = Spsa::new(0.2, 0.1, 0.602, 0.101, 5.0, 0);
        let (a0, c0) = spsa.gains(0);
        let (a9, c9) = spsa.gains(9);
        assert!((a0 - 0.2 / 6f64.powf(0.602)).abs() < 1e-15);
        assert!((c0 - 0.1).abs() < 1e-15);
        assert!(a9 < a0);
        assert!(c9 < c0);
    }

    #[test]
    fn test_seeded_steps_repeat() {
        let mut a = Spsa::new(0.2, 0.1, 0.602, 0.101, 0.0, 7);
        let mut b = Spsa::new(0.2, 0.1, 0.602, 0.101, 0.0, 7);
        let x = run(&mut a, vec![1.0, -1.0, 0.5], 20);
        let y = run(&mut b, vec![1.0, -1.0, 0.5], 20);
        assert_eq!(x, y);
        assert_eq!(a.steps(), 20);
    }

    #[test]
    fn test_descends_on_sphere() {
        let mut spsa = Spsa::new(0.3, 0.1, 0.602, 0.101, 0.0, 3);
        let start = vec![2.0, 3.0];
        let initial = (2.0f64).powi(2) + (2.0f64).powi(2);
        let end = run(&mut spsa, start, 200);
        assert!(end.energy < initial * 0.1, "energy {}", end.energy);
    }

    #[test]
    fn test_three_evaluations_per_step() {
        let mut spsa = Spsa::new(0.1, 0.1, 0.602, 0.101, 0.0, 0);
        let mut calls = 0;
        let mut objective = |p: &[f64]| -> SolveResult<f64> {
            calls += 1;
            Ok(p.iter().map(|x| x * x).sum())
        };
        let current = Iterate {
            params: vec![0.3, 0.3],
            energy: 0.18,
        };
        spsa.step(&current, &mut objective).unwrap();
        assert_eq!(calls, 3);
    }
}
