//! Version command implementation.

use console::style;

use aegis_bench::SCHEMA_VERSION;
use aegis_solve::{DEFAULT_MAX_QUBITS, DEFAULT_MAX_VARIABLES};

/// Execute the version command.
pub fn execute() {
    println!(
        "{} {}",
        style("aegis").cyan().bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).yellow()
    );
    println!("  report schema   {SCHEMA_VERSION}");
    println!("  brute force     N <= {DEFAULT_MAX_VARIABLES}");
    println!("  statevector     N <= {DEFAULT_MAX_QUBITS} qubits");
    println!();
    println!("{}", style("Solvers").bold());
    println!("  brute-force, greedy, vqe (hardware-efficient), qaoa");
    println!("{}", style("Optimizers").bold());
    println!("  spsa, nelder_mead (alias cobyla), compass");
    println!("{}", style("Noise profiles").bold());
    println!("  ideal, depolarizing:p[,m], readout:p, combined:g[,r]");
}
