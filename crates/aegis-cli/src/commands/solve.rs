//! Solve command implementation.
//!
//! `aegis solve --size N [--select k] [--penalty λ] --solver qaoa [--noise readout:0.05]`

use anyhow::{Result, bail};
use console::style;

use aegis_noise::NoiseProfile;
use aegis_qubo::{TacticalScenario, to_ising};
use aegis_solve::{
    AnsatzKind, BruteForce, Greedy, OptimizerKind, SolverResult, VariationalConfig,
    VariationalEngine,
};

use super::common::{emit_json, envelope, spinner};

/// Largest size for which the exact optimum is computed as a reference.
const REFERENCE_LIMIT: usize = 16;

/// Arguments of the solve command.
pub struct SolveArgs {
    pub size: usize,
    pub select: usize,
    pub penalty: f64,
    pub seed: u64,
    pub solver: String,
    pub optimizer: String,
    pub depth: usize,
    pub max_iterations: usize,
    pub noise: String,
    pub shots: u32,
    pub output: Option<String>,
}

/// Execute the solve command.
pub fn execute(args: &SolveArgs) -> Result<()> {
    let scenario = TacticalScenario::random(args.size, args.seed)
        .with_select(args.select)
        .with_penalty(args.penalty);
    let qubo = scenario.build()?;

    let result = match args.solver.to_lowercase().replace('_', "-").as_str() {
        "brute-force" | "bruteforce" => BruteForce::new().solve(&qubo)?,
        "greedy" => Greedy::new().solve(&qubo)?,
        name @ ("vqe" | "qaoa") => {
            let ansatz = if name == "vqe" {
                AnsatzKind::HardwareEfficient { reps: args.depth }
            } else {
                AnsatzKind::Qaoa { layers: args.depth }
            };
            let optimizer: OptimizerKind = args.optimizer.parse()?;
            let noise: NoiseProfile = args.noise.parse()?;
            let config = VariationalConfig::new(ansatz)
                .with_optimizer(optimizer)
                .with_max_iterations(args.max_iterations)
                .with_noise(noise)
                .with_shots(args.shots)
                .with_seed(args.seed);

            let reference = if qubo.n() <= REFERENCE_LIMIT {
                Some(BruteForce::new().solve(&qubo)?.bitstring)
            } else {
                None
            };

            let hamiltonian = to_ising(&qubo)?;
            let progress = spinner(format!("{ansatz} / {} on N={}", optimizer.name(), qubo.n()))?;
            let result =
                VariationalEngine::new(config).run(&qubo, &hamiltonian, reference.as_ref());
            progress.finish_and_clear();
            result?
        }
        other => bail!("Unknown solver: '{other}'. Available: brute-force, greedy, vqe, qaoa"),
    };

    emit_json(&envelope(&result), args.output.as_deref())?;
    print_summary(&scenario, &result);
    Ok(())
}

fn print_summary(scenario: &TacticalScenario, result: &SolverResult) {
    eprintln!();
    eprintln!("{}", style("Solve Summary").bold().underlined());
    eprintln!("  Solver:      {}", result.solver);
    eprintln!(
        "  Bitstring:   {} ({})",
        result.bitstring,
        if scenario.is_feasible(&result.bitstring) {
            style("feasible").green()
        } else {
            style("infeasible").red()
        }
    );
    eprintln!("  Cost:        {:.6}", result.cost);
    if let Some(energy) = result.best_energy {
        eprintln!("  ⟨H⟩ best:    {energy:.6}");
    }
    if let Some(p) = result.success_probability {
        eprintln!("  P(optimum):  {p:.4}");
    }
    eprintln!(
        "  Iterations:  {} ({} evaluations, {})",
        result.trajectory.len().saturating_sub(1),
        result.evaluations,
        if result.converged {
            "converged"
        } else {
            "budget exhausted"
        }
    );
    eprintln!("  Time:        {:.3} ms", result.duration.as_secs_f64() * 1e3);
}
