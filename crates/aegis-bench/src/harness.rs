//! Sequential execution of an [`ExperimentPlan`].
//!
//! For every size the scenario is built once, the classical baselines run
//! first and the brute-force optimum (if it was reachable) becomes the
//! reference for the variational runs of that size. A failing run is
//! recorded and the batch moves on.

use std::time::Instant;

use aegis_qubo::{Bitstring, IsingHamiltonian, QuboInstance, to_ising};
use aegis_solve::{
    BruteForce, CancelFlag, Greedy, SolveResult, SolverResult, VariationalConfig,
    VariationalEngine,
};
use tracing::{info, warn};

use crate::error::BenchResult;
use crate::plan::{ClassicalSolver, ExperimentPlan};
use crate::report::{ExperimentReport, RunOutcome, RunRecord};
use crate::reproducibility::ReproducibilityInfo;

/// Runs experiment plans.
#[derive(Debug, Clone, Default)]
pub struct ExperimentHarness {
    cancel: CancelFlag,
}

impl ExperimentHarness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share a cancel flag with the variational runs.
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Run every solver of `plan` at every size.
    pub fn run(&self, plan: &ExperimentPlan) -> BenchResult<ExperimentReport> {
        self.run_with_progress(plan, |_, _| {})
    }

    /// Like [`run`](Self::run), calling `progress(done, total)` after each run.
    pub fn run_with_progress<F>(
        &self,
        plan: &ExperimentPlan,
        mut progress: F,
    ) -> BenchResult<ExperimentReport>
    where
        F: FnMut(usize, usize),
    {
        plan.validate()?;
        let total = plan.total_runs();
        let start = Instant::now();
        info!(plan = %plan.name, runs = total, sizes = ?plan.sizes, "experiment started");

        let mut records = Vec::with_capacity(total);
        let mut cancelled = false;
        for &n in &plan.sizes {
            if self.cancel.is_cancelled() {
                warn!(plan = %plan.name, done = records.len(), total, "experiment cancelled");
                cancelled = true;
                break;
            }
            self.run_size(plan, n, &mut records, &mut progress, total);
        }
        // a cancel during the final size only shows up in that size's records
        if !cancelled && self.cancel.is_cancelled() {
            warn!(plan = %plan.name, done = records.len(), total, "experiment cancelled");
            cancelled = true;
        }

        let duration = start.elapsed();
        info!(
            plan = %plan.name,
            runs = records.len(),
            failed = records.iter().filter(|r: &&RunRecord| !r.outcome.is_completed()).count(),
            ?duration,
            "experiment finished"
        );

        Ok(ExperimentReport {
            name: plan.name.clone(),
            records,
            duration,
            cancelled,
            reproducibility: ReproducibilityInfo::capture(plan.seed, plan.scenario.seed, &[]),
        })
    }

    fn run_size<F>(
        &self,
        plan: &ExperimentPlan,
        n: usize,
        records: &mut Vec<RunRecord>,
        progress: &mut F,
        total: usize,
    ) where
        F: FnMut(usize, usize),
    {
        let mut push = |records: &mut Vec<RunRecord>, record: RunRecord| {
            records.push(record);
            progress(records.len(), total);
        };

        let problem = plan
            .scenario
            .scenario(n)
            .build()
            .and_then(|qubo| to_ising(&qubo).map(|h| (qubo, h)));
        let (qubo, hamiltonian) = match problem {
            Ok(p) => p,
            Err(e) => {
                warn!(n, error = %e, "scenario could not be built");
                for (solver, optimizer, noise) in run_labels(plan) {
                    let record = RunRecord {
                        size: n,
                        solver,
                        noise,
                        optimizer,
                        optimality_gap: None,
                        outcome: RunOutcome::Failed {
                            error: e.to_string(),
                        },
                    };
                    push(records, record);
                }
                return;
            }
        };

        let mut reference: Option<(Bitstring, f64)> = None;
        for solver in &plan.classical {
            let (label, outcome) = match solver {
                ClassicalSolver::BruteForce => (
                    "brute_force",
                    BruteForce::new()
                        .with_max_variables(plan.brute_force_limit)
                        .solve(&qubo),
                ),
                ClassicalSolver::Greedy => ("greedy", Greedy::new().solve(&qubo)),
            };
            if let (ClassicalSolver::BruteForce, Ok(r)) = (solver, &outcome) {
                reference = Some((r.bitstring.clone(), r.cost));
            }
            push(records, record(n, label.into(), None, None, outcome, None));
        }
        // greedy may have run before brute force
        let optimum = reference.as_ref().map(|(_, c)| *c);
        if let Some(c) = optimum {
            for r in records.iter_mut().filter(|r| r.size == n) {
                r.optimality_gap = r.outcome.result().map(|res| res.optimality_gap(c));
            }
        }

        for ansatz in &plan.ansatze {
            for optimizer in &plan.optimizers {
                for noise in &plan.noise {
                    let config = VariationalConfig::new(*ansatz)
                        .with_optimizer(*optimizer)
                        .with_policy(plan.policy)
                        .with_noise(noise.clone())
                        .with_shots(plan.shots)
                        .with_seed(plan.seed);
                    let outcome = self.variational(config, &qubo, &hamiltonian, &reference);
                    let label = format!("{}/{}", ansatz.name(), optimizer.name());
                    push(
                        records,
                        record(
                            n,
                            label,
                            Some(optimizer.name().to_string()),
                            Some(noise.name.clone()),
                            outcome,
                            optimum,
                        ),
                    );
                }
            }
        }
    }

    fn variational(
        &self,
        config: VariationalConfig,
        qubo: &QuboInstance,
        hamiltonian: &IsingHamiltonian,
        reference: &Option<(Bitstring, f64)>,
    ) -> SolveResult<SolverResult> {
        VariationalEngine::new(config)
            .with_cancel_flag(self.cancel.clone())
            .run(qubo, hamiltonian, reference.as_ref().map(|(b, _)| b))
    }
}

fn record(
    size: usize,
    solver: String,
    optimizer: Option<String>,
    noise: Option<String>,
    outcome: SolveResult<SolverResult>,
    optimum: Option<f64>,
) -> RunRecord {
    let outcome = match outcome {
        Ok(result) => RunOutcome::Completed(result),
        Err(e) => {
            warn!(size, solver = %solver, error = %e, "run failed");
            RunOutcome::Failed {
                error: e.to_string(),
            }
        }
    };
    let optimality_gap = optimum.and_then(|c| outcome.result().map(|r| r.optimality_gap(c)));
    RunRecord {
        size,
        solver,
        noise,
        optimizer,
        optimality_gap,
        outcome,
    }
}

/// `(solver, optimizer, noise)` for every run of one size, in run order.
fn run_labels(plan: &ExperimentPlan) -> Vec<(String, Option<String>, Option<String>)> {
    let mut labels: Vec<_> = plan
        .classical
        .iter()
        .map(|s| {
            let name = match s {
                ClassicalSolver::BruteForce => "brute_force",
                ClassicalSolver::Greedy => "greedy",
            };
            (name.to_string(), None, None)
        })
        .collect();
    for ansatz in &plan.ansatze {
        for optimizer in &plan.optimizers {
            for noise in &plan.noise {
                labels.push((
                    format!("{}/{}", ansatz.name(), optimizer.name()),
                    Some(optimizer.name().to_string()),
                    Some(noise.name.clone()),
                ));
            }
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::ScenarioTemplate;
    use aegis_noise::NoiseProfile;

    fn small_plan() -> ExperimentPlan {
        ExperimentPlan::new("test")
            .with_sizes(vec![3, 4])
            .with_policy(aegis_solve::ConvergencePolicy::default().with_max_iterations(10))
    }

    #[test]
    fn test_runs_every_combination() {
        let plan = small_plan().with_noise(vec![NoiseProfile::ideal(), NoiseProfile::readout(0.02)]);
        let report = ExperimentHarness::new().run(&plan).unwrap();
        assert_eq!(report.records.len(), plan.total_runs());
        assert_eq!(report.failed().count(), 0);
        assert!(!report.cancelled);
    }

    #[test]
    fn test_brute_force_gap_is_zero() {
        let report = ExperimentHarness::new().run(&small_plan()).unwrap();
        for r in report.records.iter().filter(|r| r.solver == "brute_force") {
            assert_eq!(r.optimality_gap, Some(0.0));
        }
        for r in report.records.iter().filter(|r| r.solver == "greedy") {
            assert!(r.optimality_gap.is_some_and(|g| g >= 0.0));
        }
    }

    #[test]
    fn test_failed_run_does_not_abort() {
        let mut plan = small_plan();
        plan.brute_force_limit = 3;
        let report = ExperimentHarness::new().run(&plan).unwrap();
        assert_eq!(report.records.len(), plan.total_runs());
        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].size, 4);
        assert_eq!(failed[0].solver, "brute_force");
        // no reference for N = 4
        assert!(report.for_size(4).all(|r| r.optimality_gap.is_none()));
    }

    #[test]
    fn test_invalid_scenario_recorded_per_run() {
        let plan = small_plan().with_scenario(ScenarioTemplate {
            select: 4,
            ..ScenarioTemplate::default()
        });
        let report = ExperimentHarness::new().run(&plan).unwrap();
        // selecting 4 of 3 fails; N = 4 runs
        assert_eq!(report.for_size(3).filter(|r| !r.outcome.is_completed()).count(), 3);
        assert_eq!(report.for_size(4).filter(|r| r.outcome.is_completed()).count(), 3);
    }

    #[test]
    fn test_progress_callback() {
        let plan = small_plan();
        let mut seen = Vec::new();
        ExperimentHarness::new()
            .run_with_progress(&plan, |done, total| seen.push((done, total)))
            .unwrap();
        assert_eq!(seen.len(), plan.total_runs());
        assert_eq!(seen.last(), Some(&(plan.total_runs(), plan.total_runs())));
    }

    #[test]
    fn test_cancelled_before_start() {
        let harness = ExperimentHarness::new();
        harness.cancel_flag().cancel();
        let report = harness.run(&small_plan()).unwrap();
        assert!(report.cancelled);
        assert!(report.records.is_empty());
    }

    #[test]
    fn test_cancelled_during_last_size() {
        let harness = ExperimentHarness::new();
        let flag = harness.cancel_flag();
        let plan = small_plan().with_sizes(vec![3]);
        let report = harness
            .run_with_progress(&plan, |done, _| {
                if done == 1 {
                    flag.cancel();
                }
            })
            .unwrap();
        assert!(report.cancelled);
        assert_eq!(report.records.len(), plan.total_runs());
        let last = report.records.last().unwrap();
        assert!(matches!(
            &last.outcome,
            RunOutcome::Failed { error } if error.contains("cancel")
        ));
    }
}
