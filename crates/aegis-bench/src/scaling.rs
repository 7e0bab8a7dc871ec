//! Exponential growth fits for solver timings.

use std::time::{Duration, Instant};

use aegis_solve::BruteForce;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BenchError, BenchResult};
use crate::plan::ScenarioTemplate;

/// Least-squares fit of `log₂(t) = intercept + slope·n`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthFit {
    /// log₂ seconds at n = 0.
    pub intercept: f64,
    /// log₂ growth per added variable.
    pub slope: f64,
    /// Time multiplier per added variable, `2^slope`.
    pub base: f64,
    /// Coefficient of determination of the log-linear fit.
    pub r_squared: f64,
}

impl GrowthFit {
    /// Predicted seconds at size `n`.
    pub fn predict(&self, n: usize) -> f64 {
        (self.intercept + self.slope * n as f64).exp2()
    }
}

/// Fit `(n, seconds)` samples to exponential growth.
///
/// Needs at least two distinct sizes and strictly positive times.
pub fn fit_exponential_growth(points: &[(usize, f64)]) -> BenchResult<GrowthFit> {
    if points.len() < 2 {
        return Err(BenchError::InsufficientData(format!(
            "need at least two samples, got {}",
            points.len()
        )));
    }
    if let Some(&(n, t)) = points.iter().find(|(_, t)| !t.is_finite() || *t <= 0.0) {
        return Err(BenchError::InsufficientData(format!(
            "non-positive time {t} at n = {n}"
        )));
    }

    let m = points.len() as f64;
    let xs: Vec<f64> = points.iter().map(|&(n, _)| n as f64).collect();
    let ys: Vec<f64> = points.iter().map(|&(_, t)| t.log2()).collect();
    let x_mean = xs.iter().sum::<f64>() / m;
    let y_mean = ys.iter().sum::<f64>() / m;

    let sxx: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
    if sxx == 0.0 {
        return Err(BenchError::InsufficientData(
            "all samples have the same size".into(),
        ));
    }
    let sxy: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (x - x_mean) * (y - y_mean))
        .sum();
    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let ss_tot: f64 = ys.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (y - intercept - slope * x).powi(2))
        .sum();
    let r_squared = if ss_tot == 0.0 {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(GrowthFit {
        intercept,
        slope,
        base: slope.exp2(),
        r_squared,
    })
}

/// Time brute force at every size, keeping the fastest of `repeats` runs.
pub fn time_brute_force(
    sizes: impl IntoIterator<Item = usize>,
    template: &ScenarioTemplate,
    repeats: usize,
) -> BenchResult<Vec<(usize, f64)>> {
    let solver = BruteForce::new();
    let mut points = Vec::new();
    for n in sizes {
        let qubo = template.scenario(n).build()?;
        let mut fastest = Duration::MAX;
        for _ in 0..repeats.max(1) {
            let start = Instant::now();
            solver.solve(&qubo)?;
            fastest = fastest.min(start.elapsed());
        }
        debug!(n, seconds = fastest.as_secs_f64(), "timed brute force");
        points.push((n, fastest.as_secs_f64()));
    }
    Ok(points)
}
