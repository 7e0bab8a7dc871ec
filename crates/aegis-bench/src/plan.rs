//! Experiment plans: which sizes, solvers and noise levels to run.
//!
//! Plans are plain serde structs and load from YAML or JSON:
//!
//! ```yaml
//! name: noise-study
//! sizes: [4, 6]
//! scenario: { select: 1, penalty: 10.0, seed: 7 }
//! ansatze:
//!   - { kind: qaoa, layers: 2 }
//! noise:
//!   - { name: ideal, channels: [] }
//!   - name: readout
//!     channels: [{ kind: readout, p: 0.05 }]
//! ```

use std::path::Path;

use aegis_noise::NoiseProfile;
use aegis_qubo::TacticalScenario;
use aegis_solve::{AnsatzKind, ConvergencePolicy, DEFAULT_MAX_VARIABLES, OptimizerKind};
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};

/// Parameters shared by the scenario generated for every size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioTemplate {
    /// Risk weight α.
    pub alpha: f64,
    /// Distance weight β.
    pub beta: f64,
    /// Penalty coefficient λ.
    pub penalty: f64,
    /// Positions to select.
    pub select: usize,
    /// Seed for the random cost vectors.
    pub seed: u64,
}

impl Default for ScenarioTemplate {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
            penalty: 10.0,
            select: 1,
            seed: 7,
        }
    }
}

impl ScenarioTemplate {
    /// Random scenario with `n` positions.
    pub fn scenario(&self, n: usize) -> TacticalScenario {
        TacticalScenario::random(n, self.seed)
            .with_weights(self.alpha, self.beta)
            .with_penalty(self.penalty)
            .with_select(self.select)
    }
}

/// Classical baseline to include in a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassicalSolver {
    BruteForce,
    Greedy,
}

/// A batch of solver runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentPlan {
    /// Plan name, copied into the report.
    pub name: String,
    /// Scenario parameters.
    pub scenario: ScenarioTemplate,
    /// Problem sizes N.
    pub sizes: Vec<usize>,
    /// Classical solvers run at every size.
    pub classical: Vec<ClassicalSolver>,
    /// Ansätze; each is run with every optimizer and noise profile.
    pub ansatze: Vec<AnsatzKind>,
    /// Optimizers for the variational runs.
    pub optimizers: Vec<OptimizerKind>,
    /// Noise profiles for the variational runs.
    pub noise: Vec<NoiseProfile>,
    /// Stopping rules for the variational runs.
    pub policy: ConvergencePolicy,
    /// Final measurement shots.
    pub shots: u32,
    /// Brute-force variable ceiling.
    pub brute_force_limit: usize,
    /// Seed for every variational run.
    pub seed: u64,
}

impl Default for ExperimentPlan {
    fn default() -> Self {
        Self {
            name: "experiment".into(),
            scenario: ScenarioTemplate::default(),
            sizes: vec![4],
            classical: vec![ClassicalSolver::BruteForce, ClassicalSolver::Greedy],
            ansatze: vec![AnsatzKind::qaoa()],
            optimizers: vec![OptimizerKind::spsa()],
            noise: vec![NoiseProfile::ideal()],
            policy: ConvergencePolicy::default(),
            shots: 1024,
            brute_force_limit: DEFAULT_MAX_VARIABLES,
            seed: 42,
        }
    }
}

impl ExperimentPlan {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Classical baselines and one QAOA run per size.
    pub fn scaling_sweep(sizes: impl IntoIterator<Item = usize>) -> Self {
        Self {
            name: "scaling".into(),
            sizes: sizes.into_iter().collect(),
            ..Self::default()
        }
    }

    /// One size, one ansatz, every noise profile.
    pub fn noise_sweep(n: usize, noise: impl IntoIterator<Item = NoiseProfile>) -> Self {
        Self {
            name: "noise".into(),
            sizes: vec![n],
            classical: vec![ClassicalSolver::BruteForce],
            noise: noise.into_iter().collect(),
            ..Self::default()
        }
    }

    /// One size, one ansatz, every optimizer.
    pub fn optimizer_sweep(n: usize, optimizers: impl IntoIterator<Item = OptimizerKind>) -> Self {
        Self {
            name: "optimizers".into(),
            sizes: vec![n],
            classical: vec![ClassicalSolver::BruteForce],
            optimizers: optimizers.into_iter().collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_scenario(mut self, scenario: ScenarioTemplate) -> Self {
        self.scenario = scenario;
        self
    }

    #[must_use]
    pub fn with_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.sizes = sizes;
        self
    }

    #[must_use]
    pub fn with_classical(mut self, classical: Vec<ClassicalSolver>) -> Self {
        self.classical = classical;
        self
    }

    #[must_use]
    pub fn with_ansatze(mut self, ansatze: Vec<AnsatzKind>) -> Self {
        self.ansatze = ansatze;
        self
    }

    #[must_use]
    pub fn with_optimizers(mut self, optimizers: Vec<OptimizerKind>) -> Self {
        self.optimizers = optimizers;
        self
    }

    #[must_use]
    pub fn with_noise(mut self, noise: Vec<NoiseProfile>) -> Self {
        self.noise = noise;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ConvergencePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Parse a YAML plan.
    pub fn from_yaml(text: &str) -> BenchResult<Self> {
        let plan: Self = serde_yaml_ng::from_str(text)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Parse a JSON plan.
    pub fn from_json(text: &str) -> BenchResult<Self> {
        let plan: Self =
            serde_json::from_str(text).map_err(|e| BenchError::Plan(e.to_string()))?;
        plan.validate()?;
        Ok(plan)
    }

    /// Load a plan file; `.json` is read as JSON, anything else as YAML.
    pub fn from_file(path: &Path) -> BenchResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| BenchError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text),
            _ => Self::from_yaml(&text),
        }
    }

    /// Reject plans that cannot produce any run.
    pub fn validate(&self) -> BenchResult<()> {
        if self.sizes.is_empty() {
            return Err(BenchError::Plan("no problem sizes given".into()));
        }
        if self.sizes.contains(&0) {
            return Err(BenchError::Plan("problem size must be at least 1".into()));
        }
        if self.classical.is_empty() && self.variational_runs() == 0 {
            return Err(BenchError::Plan("plan contains no solver runs".into()));
        }
        self.policy.validate()?;
        for optimizer in &self.optimizers {
            optimizer.validate()?;
        }
        for profile in &self.noise {
            profile
                .validate()
                .map_err(|e| BenchError::Plan(format!("noise profile '{}': {e}", profile.name)))?;
        }
        Ok(())
    }

    /// Variational runs per size.
    pub fn variational_runs(&self) -> usize {
        self.ansatze.len() * self.optimizers.len() * self.noise.len()
    }

    /// Total runs in the plan.
    pub fn total_runs(&self) -> usize {
        self.sizes.len() * (self.classical.len() + self.variational_runs())
    }
}
