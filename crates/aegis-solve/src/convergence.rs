//! Stopping rules for the variational loop.

use serde::{Deserialize, Serialize};

use crate::error::{SolveError, SolveResult};
use crate::result::Trajectory;

/// Why a variational run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Best-energy improvement over the window fell below the tolerance.
    Converged,
    /// The iteration budget ran out first.
    MaxIterations,
}

/// Iteration budget plus sliding-window improvement test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvergencePolicy {
    /// Maximum optimizer steps.
    pub max_iterations: usize,
    /// Minimum best-energy improvement over `window` steps.
    pub tolerance: f64,
    /// Window length in iterations.
    pub window: usize,
}

impl Default for ConvergencePolicy {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
            window: 10,
        }
    }
}

impl ConvergencePolicy {
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Reject a zero window or a negative / non-finite tolerance.
    pub fn validate(&self) -> SolveResult<()> {
        if self.window == 0 {
            return Err(SolveError::InvalidConfig(
                "convergence window must be at least 1".into(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SolveError::InvalidConfig(format!(
                "convergence tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    /// Decide whether the run should stop after the last recorded point.
    ///
    /// The trajectory's first point is the initial evaluation (iteration 0);
    /// each later point is one optimizer step.
    pub fn check(&self, trajectory: &Trajectory) -> Option<StopReason> {
        let last = trajectory.last()?;
        let len = trajectory.len();
        if len > self.window {
            let earlier = trajectory.get(len - 1 - self.window)?;
            if earlier.best_energy - last.best_energy < self.tolerance {
                return Some(StopReason::Converged);
            }
        }
        if last.iteration >= self.max_iterations {
            return Some(StopReason::MaxIterations);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trajectory(energies: &[f64]) -> Trajectory {
        let mut t = Trajectory::new();
        for (i, e) in energies.iter().enumerate() {
            t.push(i, *e);
        }
        t
    }

    #[test]
    fn test_window_convergence() {
        let policy = ConvergencePolicy::default().with_window(2).with_tolerance(1e-3);
        assert_eq!(policy.check(&trajectory(&[1.0, 0.5])), None);
        assert_eq!(policy.check(&trajectory(&[1.0, 0.5, 0.2])), None);
        assert_eq!(
            policy.check(&trajectory(&[1.0, 0.5, 0.5, 0.5])),
            Some(StopReason::Converged)
        );
    }

    #[test]
    fn test_budget() {
        let policy = ConvergencePolicy::default()
            .with_max_iterations(3)
            .with_window(10);
        assert_eq!(policy.check(&trajectory(&[3.0, 2.0, 1.0])), None);
        assert_eq!(
            policy.check(&trajectory(&[3.0, 2.0, 1.0, 0.0])),
            Some(StopReason::MaxIterations)
        );
    }

    #[test]
    fn test_zero_budget_stops_after_initial_point() {
        let policy = ConvergencePolicy::default().with_max_iterations(0);
        assert_eq!(
            policy.check(&trajectory(&[1.0])),
            Some(StopReason::MaxIterations)
        );
    }

    #[test]
    fn test_validate() {
        assert!(ConvergencePolicy::default().validate().is_ok());
        assert!(ConvergencePolicy::default().with_window(0).validate().is_err());
        assert!(
            ConvergencePolicy::default()
                .with_tolerance(f64::NAN)
                .validate()
                .is_err()
        );
    }
}
