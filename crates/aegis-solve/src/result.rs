//! Solver output: energy trajectories and per-run results.

use std::time::Duration;

use aegis_qubo::Bitstring;
use serde::{Deserialize, Serialize};

use crate::ansatz::AnsatzKind;
use crate::convergence::StopReason;

/// One recorded step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    /// Iteration number (0 is the initial evaluation).
    pub iteration: usize,
    /// Energy of the iterate accepted at this step.
    pub energy: f64,
    /// Lowest energy seen so far.
    pub best_energy: f64,
}

/// Ordered, index-addressable energy history.
///
/// `best_energy` is non-increasing by construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trajectory {
    points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `(iteration, energy)` and update the running best.
    pub fn push(&mut self, iteration: usize, energy: f64) {
        let best_energy = match self.points.last() {
            Some(p) if p.best_energy <= energy => p.best_energy,
            _ => energy,
        };
        self.points.push(TrajectoryPoint {
            iteration,
            energy,
            best_energy,
        });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrajectoryPoint> {
        self.points.get(index)
    }

    pub fn last(&self) -> Option<&TrajectoryPoint> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrajectoryPoint> {
        self.points.iter()
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    /// The first `len` points, for replaying a run from a history prefix.
    pub fn prefix(&self, len: usize) -> Trajectory {
        Trajectory {
            points: self.points[..len.min(self.points.len())].to_vec(),
        }
    }

    /// Lowest energy recorded.
    pub fn best_energy(&self) -> Option<f64> {
        self.points.last().map(|p| p.best_energy)
    }

    /// `(iteration, energy)` pairs.
    pub fn energies(&self) -> Vec<(usize, f64)> {
        self.points.iter().map(|p| (p.iteration, p.energy)).collect()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectoryPoint;
    type IntoIter = std::slice::Iter<'a, TrajectoryPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl std::ops::Index<usize> for Trajectory {
    type Output = TrajectoryPoint;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

/// Which solver produced a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolverKind {
    /// Exhaustive enumeration.
    BruteForce,
    /// Steepest-descent single-bit flips.
    Greedy,
    /// Ansatz + classical optimizer.
    Variational {
        /// Ansatz used.
        ansatz: AnsatzKind,
        /// Optimizer name.
        optimizer: String,
        /// Noise profile name.
        noise: String,
    },
}

impl SolverKind {
    /// Short label such as `brute_force`, `greedy` or `qaoa/spsa`.
    pub fn label(&self) -> String {
        match self {
            SolverKind::BruteForce => "brute_force".into(),
            SolverKind::Greedy => "greedy".into(),
            SolverKind::Variational {
                ansatz, optimizer, ..
            } => format!("{}/{}", ansatz.name(), optimizer),
        }
    }
}

/// A sampled measurement outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Measured assignment.
    pub bitstring: Bitstring,
    /// Number of shots that produced it.
    pub count: usize,
}

/// Result of one solver run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    /// Solver label.
    pub solver: String,
    /// Solver identity.
    pub kind: SolverKind,
    /// Best assignment found.
    pub bitstring: Bitstring,
    /// QUBO cost of `bitstring`.
    pub cost: f64,
    /// Energy history.
    pub trajectory: Trajectory,
    /// Wall-clock duration of the run.
    pub duration: Duration,
    /// Whether the run met its stopping criterion rather than its budget.
    pub converged: bool,
    /// Stop reason for iterative runs.
    pub stop_reason: Option<StopReason>,
    /// Lowest variational energy ⟨H⟩ seen.
    pub best_energy: Option<f64>,
    /// θ at the lowest energy.
    pub optimal_params: Option<Vec<f64>>,
    /// Objective evaluations (cost evaluations for classical solvers).
    pub evaluations: usize,
    /// Probability of `bitstring` in the final distribution.
    pub outcome_probability: Option<f64>,
    /// Probability of the reference optimum in the final distribution.
    pub success_probability: Option<f64>,
    /// Most frequent sampled outcomes, descending.
    #[serde(default)]
    pub top_outcomes: Vec<Outcome>,
}

impl SolverResult {
    /// Result shell for a classical solver.
    pub(crate) fn classical(
        kind: SolverKind,
        bitstring: Bitstring,
        cost: f64,
        trajectory: Trajectory,
        duration: Duration,
        evaluations: usize,
    ) -> Self {
        Self {
            solver: kind.label(),
            kind,
            bitstring,
            cost,
            trajectory,
            duration,
            converged: true,
            stop_reason: None,
            best_energy: None,
            optimal_params: None,
            evaluations,
            outcome_probability: None,
            success_probability: None,
            top_outcomes: Vec::new(),
        }
    }

    /// `cost − reference_cost`; zero when the optimum was found.
    pub fn optimality_gap(&self, reference_cost: f64) -> f64 {
        self.cost - reference_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_energy_is_running_minimum() {
        let mut t = Trajectory::new();
        for (i, e) in [3.0, 1.0, 2.0, 0.5, 0.7].into_iter().enumerate() {
            t.push(i, e);
        }
        let best: Vec<f64> = t.iter().map(|p| p.best_energy).collect();
        assert_eq!(best, vec![3.0, 1.0, 1.0, 0.5, 0.5]);
        assert_eq!(t.best_energy(), Some(0.5));
        assert_eq!(t[2].energy, 2.0);
    }

    #[test]
    fn test_prefix() {
        let mut t = Trajectory::new();
        for i in 0..5 {
            t.push(i, -(i as f64));
        }
        let p = t.prefix(3);
        assert_eq!(p.len(), 3);
        assert_eq!(p.last().map(|x| x.iteration), Some(2));
        assert_eq!(t.prefix(10).len(), 5);
    }

    #[test]
    fn test_labels() {
        assert_eq!(SolverKind::BruteForce.label(), "brute_force");
        let v = SolverKind::Variational {
            ansatz: AnsatzKind::qaoa(),
            optimizer: "spsa".into(),
            noise: "ideal".into(),
        };
        assert_eq!(v.label(), "qaoa/spsa");
    }

    #[test]
    fn test_trajectory_serializes_as_list() {
        let mut t = Trajectory::new();
        t.push(0, 1.0);
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.starts_with('['));
    }
}
