//! The variational solve loop.
//!
//! One run walks the states Init → (Evaluate → Optimize step → Convergence
//! check)* → exit:
//!
//! - **Init** draws θ₀ and evaluates it as iteration 0.
//! - **Evaluate** simulates `|ψ(θ)⟩`, takes `⟨Z_S⟩` for every Ising term
//!   from the basis probabilities, passes each through the noise injector and
//!   sums `offset + Σ c·⟨Z_S⟩`. The cancel flag is checked first.
//! - **Optimize step** hands the current iterate to the optimizer, which
//!   calls Evaluate as often as it needs.
//! - **Convergence check** consults the [`ConvergencePolicy`].
//!
//! On exit the lowest-energy θ is re-simulated, its distribution is passed
//! through the injector's flip channels and sampled; the mode is the
//! reported bitstring.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use aegis_noise::{NoiseInjector, NoiseProfile};
use aegis_qubo::{Bitstring, IsingHamiltonian, QuboError, QuboInstance, to_ising};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ansatz::{AnsatzKind, AnsatzState, ParameterInit};
use crate::convergence::{ConvergencePolicy, StopReason};
use crate::error::{SolveError, SolveResult};
use crate::optimizers::{Iterate, OptimizerKind};
use crate::result::{Outcome, SolverKind, SolverResult, Trajectory};
use crate::statevector::{DEFAULT_MAX_QUBITS, HARD_MAX_QUBITS, z_expectation};

const STREAM_INIT: u64 = 1;
const STREAM_OPTIMIZER: u64 = 2;
const STREAM_NOISE: u64 = 3;
const STREAM_SAMPLING: u64 = 4;

/// Number of sampled outcomes kept in a result.
const TOP_OUTCOMES: usize = 8;

/// Shared cancellation signal, checked at the top of every evaluation.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every run holding this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Configuration of a variational run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariationalConfig {
    /// Ansatz family and depth.
    pub ansatz: AnsatzKind,
    /// Classical optimizer.
    pub optimizer: OptimizerKind,
    /// Stopping rules.
    pub policy: ConvergencePolicy,
    /// First θ.
    pub init: ParameterInit,
    /// Run seed; every random stream is derived from it.
    pub seed: u64,
    /// Noise applied to evaluations and the final distribution.
    pub noise: NoiseProfile,
    /// Shots for the final measurement; 0 takes the exact arg-max.
    pub shots: u32,
    /// Qubit ceiling for the simulator.
    pub max_qubits: usize,
}

impl Default for VariationalConfig {
    fn default() -> Self {
        Self {
            ansatz: AnsatzKind::vqe(),
            optimizer: OptimizerKind::spsa(),
            policy: ConvergencePolicy::default(),
            init: ParameterInit::Ansatz,
            seed: 42,
            noise: NoiseProfile::ideal(),
            shots: 1024,
            max_qubits: DEFAULT_MAX_QUBITS,
        }
    }
}

impl VariationalConfig {
    pub fn new(ansatz: AnsatzKind) -> Self {
        Self {
            ansatz,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.optimizer = optimizer;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ConvergencePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.policy.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_init(mut self, init: ParameterInit) -> Self {
        self.init = init;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_noise(mut self, noise: NoiseProfile) -> Self {
        self.noise = noise;
        self
    }

    #[must_use]
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }
}

/// Seed of an independent random stream derived from a run seed (SplitMix64).
pub fn derive_seed(seed: u64, stream: u64) -> u64 {
    const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut z = (seed ^ stream.wrapping_mul(GOLDEN)).wrapping_add(GOLDEN);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Energy evaluation shared by every optimizer call of one run.
struct Evaluator<'a> {
    ansatz: AnsatzKind,
    hamiltonian: &'a IsingHamiltonian,
    // energies of every basis state, used when no noise stage is active
    diagonal: Option<Vec<f64>>,
    injector: NoiseInjector,
    max_qubits: usize,
    cancel: &'a CancelFlag,
    evaluations: usize,
    iteration: usize,
    last_valid: Option<usize>,
}

impl Evaluator<'_> {
    fn energy(&mut self, params: &[f64]) -> SolveResult<f64> {
        if self.cancel.is_cancelled() {
            return Err(SolveError::Cancelled {
                iteration: self.iteration,
            });
        }
        let probs = self
            .ansatz
            .prepare_state(self.hamiltonian, params, self.max_qubits)?
            .probabilities();
        self.evaluations += 1;
        if probs.iter().any(|p| !p.is_finite()) {
            return Err(self.instability());
        }

        let energy = match &self.diagonal {
            Some(diag) => probs.iter().zip(diag).map(|(p, e)| p * e).sum(),
            None => {
                let mut energy = self.hamiltonian.offset();
                for term in self.hamiltonian.terms() {
                    let ideal = z_expectation(&probs, term.mask());
                    if !ideal.is_finite() {
                        return Err(self.instability());
                    }
                    energy += term.coeff * self.injector.perturb(ideal, term);
                }
                energy
            }
        };

        if !energy.is_finite() {
            return Err(self.instability());
        }
        Ok(energy)
    }

    fn instability(&self) -> SolveError {
        SolveError::NumericalInstability {
            iteration: self.iteration,
            last_valid: self.last_valid,
        }
    }
}

/// Runs one variational optimisation per call.
#[derive(Debug, Clone, Default)]
pub struct VariationalEngine {
    config: VariationalConfig,
    cancel: CancelFlag,
}

impl VariationalEngine {
    pub fn new(config: VariationalConfig) -> Self {
        Self {
            config,
            cancel: CancelFlag::new(),
        }
    }

    /// Share an external cancel flag.
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &VariationalConfig {
        &self.config
    }

    /// Handle that cancels this engine's runs.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Build the Ising form and run.
    pub fn solve(&self, qubo: &QuboInstance) -> SolveResult<SolverResult> {
        let hamiltonian = to_ising(qubo)?;
        self.run(qubo, &hamiltonian, None)
    }

    /// Run against a prepared Hamiltonian.
    ///
    /// With `reference` set, the result carries that bitstring's probability
    /// in the final distribution as `success_probability`.
    pub fn run(
        &self,
        qubo: &QuboInstance,
        hamiltonian: &IsingHamiltonian,
        reference: Option<&Bitstring>,
    ) -> SolveResult<SolverResult> {
        let cfg = &self.config;
        let n = hamiltonian.n();
        cfg.policy.validate()?;
        if qubo.n() != n {
            return Err(QuboError::SizeMismatch {
                expected: n,
                got: qubo.n(),
            }
            .into());
        }
        if let Some(r) = reference {
            if r.len() != n {
                return Err(QuboError::SizeMismatch {
                    expected: n,
                    got: r.len(),
                }
                .into());
            }
        }
        let limit = cfg.max_qubits.min(HARD_MAX_QUBITS);
        if n > limit {
            return Err(SolveError::IntractableSize {
                solver: cfg.ansatz.name(),
                n,
                limit,
            });
        }

        let mut optimizer = cfg.optimizer.build(derive_seed(cfg.seed, STREAM_OPTIMIZER))?;
        let injector = NoiseInjector::new(&cfg.noise, derive_seed(cfg.seed, STREAM_NOISE))?;
        let mut init_rng = StdRng::seed_from_u64(derive_seed(cfg.seed, STREAM_INIT));
        let mut state = AnsatzState::new(
            cfg.ansatz,
            n,
            cfg.init.initial(&cfg.ansatz, n, &mut init_rng)?,
        )?;

        info!(
            n,
            ansatz = %cfg.ansatz,
            optimizer = optimizer.name(),
            noise = %cfg.noise,
            lambda = hamiltonian.lambda(),
            seed = cfg.seed,
            "variational run started"
        );

        let start = Instant::now();
        let diagonal = if injector.channels().is_empty() {
            hamiltonian
                .diagonal()
                .filter(|d| d.iter().all(|e| e.is_finite()))
        } else {
            None
        };
        let mut evaluator = Evaluator {
            ansatz: cfg.ansatz,
            hamiltonian,
            diagonal,
            injector,
            max_qubits: cfg.max_qubits,
            cancel: &self.cancel,
            evaluations: 0,
            iteration: 0,
            last_valid: None,
        };

        let mut trajectory = Trajectory::new();
        let energy = evaluator.energy(state.params())?;
        trajectory.push(0, energy);
        evaluator.last_valid = Some(0);

        let mut current = Iterate {
            params: state.params().to_vec(),
            energy,
        };
        let mut best = current.clone();
        let mut iteration = 0;

        let reason = loop {
            if let Some(reason) = cfg.policy.check(&trajectory) {
                break reason;
            }
            iteration += 1;
            evaluator.iteration = iteration;
            if self.cancel.is_cancelled() {
                return Err(SolveError::Cancelled { iteration });
            }

            let next = {
                let mut objective = |p: &[f64]| evaluator.energy(p);
                optimizer.step(&current, &mut objective)?
            };
            if !next.energy.is_finite() {
                return Err(evaluator.instability());
            }

            state.set_params(next.params.clone())?;
            trajectory.push(iteration, next.energy);
            evaluator.last_valid = Some(iteration);
            if next.energy < best.energy {
                best = next.clone();
            }
            debug!(
                iteration,
                energy = next.energy,
                best = best.energy,
                evaluations = evaluator.evaluations,
                "variational step"
            );
            current = next;
        };

        let mut probs = cfg
            .ansatz
            .prepare_state(hamiltonian, &best.params, cfg.max_qubits)?
            .probabilities();
        evaluator.injector.perturb_distribution(&mut probs);

        let mut sampling_rng = StdRng::seed_from_u64(derive_seed(cfg.seed, STREAM_SAMPLING));
        let (mode, counts) =
            measure(&probs, cfg.shots, &mut sampling_rng).ok_or_else(|| evaluator.instability())?;
        let bitstring = Bitstring::from_index(mode, n);
        let cost = qubo.evaluate(&bitstring);
        let duration = start.elapsed();

        let converged = reason == StopReason::Converged;
        if !converged {
            warn!(
                iterations = iteration,
                best_energy = best.energy,
                "variational run hit its iteration budget before converging"
            );
        }
        info!(
            iterations = iteration,
            evaluations = evaluator.evaluations,
            best_energy = best.energy,
            bitstring = %bitstring,
            cost,
            ?duration,
            "variational run finished"
        );

        let kind = SolverKind::Variational {
            ansatz: cfg.ansatz,
            optimizer: optimizer.name().to_string(),
            noise: cfg.noise.name.clone(),
        };
        Ok(SolverResult {
            solver: kind.label(),
            kind,
            outcome_probability: Some(probs[mode]),
            success_probability: reference.map(|r| probs[r.to_index()]),
            top_outcomes: counts
                .into_iter()
                .map(|(index, count)| Outcome {
                    bitstring: Bitstring::from_index(index, n),
                    count,
                })
                .collect(),
            bitstring,
            cost,
            trajectory,
            duration,
            converged,
            stop_reason: Some(reason),
            best_energy: Some(best.energy),
            optimal_params: Some(best.params),
            evaluations: evaluator.evaluations,
        })
    }
}

/// Sample `shots` outcomes and return the mode (lowest index on ties) with
/// the most frequent outcomes. `shots == 0` returns the exact arg-max.
fn measure<R: Rng>(
    probs: &[f64],
    shots: u32,
    rng: &mut R,
) -> Option<(usize, Vec<(usize, usize)>)> {
    if probs.iter().any(|p| !p.is_finite()) {
        return None;
    }
    if shots == 0 {
        let mode = argmax(probs.iter().copied())?;
        return Some((mode, Vec::new()));
    }

    let dist = WeightedIndex::new(probs).ok()?;
    let mut counts = vec![0usize; probs.len()];
    for _ in 0..shots {
        counts[dist.sample(rng)] += 1;
    }
    let mode = argmax(counts.iter().map(|&c| c as f64))?;

    let mut top: Vec<(usize, usize)> = counts
        .into_iter()
        .enumerate()
        .filter(|(_, c)| *c > 0)
        .collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    top.truncate(TOP_OUTCOMES);
    Some((mode, top))
}

/// Index of the largest value, first one on ties.
fn argmax(values: impl Iterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.enumerate() {
        if best.is_none_or(|(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}
