//! Experiment command implementation.
//!
//! `aegis experiment --plan plan.yaml [--output report.json]`

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use tracing::info;

use aegis_bench::{ExperimentHarness, ExperimentPlan};

use super::common::{emit_report, progress_bar};

/// Execute the experiment command.
pub fn execute(plan_path: &str, output: Option<&str>) -> Result<()> {
    let plan = ExperimentPlan::from_file(Path::new(plan_path))
        .with_context(|| format!("Failed to load plan: {plan_path}"))?;
    info!(plan = %plan.name, path = plan_path, "loaded experiment plan");

    eprintln!(
        "{} {} ({} runs over sizes {:?})",
        style("Running").cyan().bold(),
        plan.name,
        plan.total_runs(),
        plan.sizes
    );

    let bar = progress_bar(plan.total_runs())?;
    let report = ExperimentHarness::new().run_with_progress(&plan, |done, _| {
        bar.set_position(done as u64);
    })?;
    bar.finish_and_clear();

    let cli_args: Vec<String> = std::env::args().collect();
    let report = report.with_cli_args(&cli_args);
    emit_report(&report, output)?;

    eprintln!();
    eprintln!("{}", style("Experiment Summary").bold().underlined());
    eprint!("{}", report.summary());
    Ok(())
}
