//! Aegis Command-Line Interface
//!
//! Runs single solves, experiment plans and brute-force scaling sweeps over
//! the tactical position-selection QUBO.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{experiment, scaling, solve, version};

/// Aegis - classical vs. variational QUBO comparison
#[derive(Parser)]
#[command(name = "aegis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one random tactical scenario
    Solve {
        /// Number of candidate positions
        #[arg(short = 'n', long)]
        size: usize,

        /// Positions to select
        #[arg(short = 'k', long, default_value = "1")]
        select: usize,

        /// Penalty coefficient λ
        #[arg(short, long, default_value = "10.0")]
        penalty: f64,

        /// Seed for the scenario and the solver
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Solver (brute-force, greedy, vqe, qaoa)
        #[arg(short, long, default_value = "qaoa")]
        solver: String,

        /// Optimizer for variational solvers (spsa, nelder-mead, compass)
        #[arg(long, default_value = "spsa")]
        optimizer: String,

        /// Ansatz depth (VQE reps or QAOA layers)
        #[arg(short, long, default_value = "2")]
        depth: usize,

        /// Iteration budget for variational solvers
        #[arg(long, default_value = "100")]
        max_iterations: usize,

        /// Noise profile (ideal, depolarizing:p, readout:p, combined:p,q)
        #[arg(long, default_value = "ideal")]
        noise: String,

        /// Measurement shots (0 takes the most likely outcome)
        #[arg(long, default_value = "1024")]
        shots: u32,

        /// Output file for the JSON result (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run an experiment plan (YAML or JSON)
    Experiment {
        /// Plan file
        #[arg(long)]
        plan: String,

        /// Output file for the JSON report (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Time brute force over a range of sizes and fit the growth rate
    Scaling {
        /// Smallest size
        #[arg(long, default_value = "4")]
        min: usize,

        /// Largest size
        #[arg(long, default_value = "12")]
        max: usize,

        /// Timed repetitions per size (fastest is kept)
        #[arg(long, default_value = "3")]
        repeats: usize,

        /// Scenario seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output file for the JSON timings (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Solve {
            size,
            select,
            penalty,
            seed,
            solver,
            optimizer,
            depth,
            max_iterations,
            noise,
            shots,
            output,
        } => solve::execute(&solve::SolveArgs {
            size,
            select,
            penalty,
            seed,
            solver,
            optimizer,
            depth,
            max_iterations,
            noise,
            shots,
            output,
        }),

        Commands::Experiment { plan, output } => experiment::execute(&plan, output.as_deref()),

        Commands::Scaling {
            min,
            max,
            repeats,
            seed,
            output,
        } => scaling::execute(min, max, repeats, seed, output.as_deref()),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
