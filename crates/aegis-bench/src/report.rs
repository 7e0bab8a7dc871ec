//! Collected results of an experiment.

use std::time::Duration;

use aegis_solve::SolverResult;
use serde::{Deserialize, Serialize};

use crate::reproducibility::ReproducibilityInfo;

/// What happened to one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The solver returned a result.
    Completed(SolverResult),
    /// The solver failed; the rest of the batch still ran.
    Failed {
        /// Rendered error.
        error: String,
    },
}

impl RunOutcome {
    pub fn result(&self) -> Option<&SolverResult> {
        match self {
            RunOutcome::Completed(r) => Some(r),
            RunOutcome::Failed { .. } => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }
}

/// One solver run inside an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Problem size N.
    pub size: usize,
    /// Solver label (`brute_force`, `greedy`, `qaoa/spsa`, ...).
    pub solver: String,
    /// Noise profile name for variational runs.
    pub noise: Option<String>,
    /// Optimizer name for variational runs.
    pub optimizer: Option<String>,
    /// Cost minus the brute-force optimum, when both are known.
    pub optimality_gap: Option<f64>,
    /// Result or error.
    pub outcome: RunOutcome,
}

impl RunRecord {
    /// Wall-clock duration of a completed run.
    pub fn duration(&self) -> Option<Duration> {
        self.outcome.result().map(|r| r.duration)
    }
}

/// Everything one experiment produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    /// Plan name.
    pub name: String,
    /// Runs in execution order.
    pub records: Vec<RunRecord>,
    /// Total wall-clock time.
    pub duration: Duration,
    /// Whether the batch was cancelled before every run finished.
    #[serde(default)]
    pub cancelled: bool,
    /// Versions, seeds and command line.
    pub reproducibility: ReproducibilityInfo,
}

impl ExperimentReport {
    /// Replace the recorded command line.
    #[must_use]
    pub fn with_cli_args(mut self, cli_args: &[String]) -> Self {
        self.reproducibility.cli_args = cli_args.to_vec();
        self
    }

    pub fn completed(&self) -> impl Iterator<Item = &RunRecord> {
        self.records.iter().filter(|r| r.outcome.is_completed())
    }

    pub fn failed(&self) -> impl Iterator<Item = &RunRecord> {
        self.records.iter().filter(|r| !r.outcome.is_completed())
    }

    /// Records for problem size `n`.
    pub fn for_size(&self, n: usize) -> impl Iterator<Item = &RunRecord> {
        self.records.iter().filter(move |r| r.size == n)
    }

    /// `(N, seconds)` for every completed run of `solver`.
    pub fn timings(&self, solver: &str) -> Vec<(usize, f64)> {
        self.completed()
            .filter(|r| r.solver == solver)
            .filter_map(|r| r.duration().map(|d| (r.size, d.as_secs_f64())))
            .collect()
    }

    /// One line per run.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "{}: {} runs, {} failed, {:.3}s\n",
            self.name,
            self.records.len(),
            self.failed().count(),
            self.duration.as_secs_f64()
        );
        for r in &self.records {
            let label = match (&r.optimizer, &r.noise) {
                (_, Some(noise)) => format!("{} [{}]", r.solver, noise),
                _ => r.solver.clone(),
            };
            match &r.outcome {
                RunOutcome::Completed(res) => {
                    out.push_str(&format!(
                        "  N={:<3} {:<28} {} cost={:.4}",
                        r.size, label, res.bitstring, res.cost
                    ));
                    if let Some(gap) = r.optimality_gap {
                        out.push_str(&format!(" gap={gap:.4}"));
                    }
                    if let Some(p) = res.success_probability {
                        out.push_str(&format!(" p_opt={p:.3}"));
                    }
                    out.push_str(&format!(" {:.3}ms\n", res.duration.as_secs_f64() * 1e3));
                }
                RunOutcome::Failed { error } => {
                    out.push_str(&format!("  N={:<3} {:<28} failed: {}\n", r.size, label, error));
                }
            }
        }
        out
    }
}
