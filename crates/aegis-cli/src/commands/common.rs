//! Shared helpers for CLI commands.

use std::path::Path;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use aegis_bench::{Envelope, ExperimentReport, ExportConfig, to_file, to_json, write_report};

/// Print `value` as JSON, or write it to `output` when given.
pub fn emit_json<T: serde::Serialize>(value: &T, output: Option<&str>) -> Result<()> {
    let config = ExportConfig::default();
    if let Some(path) = output {
        to_file(value, Path::new(path), &config)?;
        eprintln!("{} Written to {}", style("OK").green().bold(), path);
    } else {
        println!("{}", to_json(value, &config)?);
    }
    Ok(())
}

/// Print `report` as JSON, or write it to `output` in the format its
/// extension selects.
pub fn emit_report(report: &ExperimentReport, output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            let path = Path::new(path);
            write_report(report, path, &ExportConfig::for_path(path))?;
            eprintln!("{} Written to {}", style("OK").green().bold(), path.display());
        }
        None => println!("{}", to_json(report, &ExportConfig::default())?),
    }
    Ok(())
}

/// Spinner with a message, as used for single long runs.
pub fn spinner(message: impl Into<String>) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(spinner)
}

/// Bar for a known number of runs.
pub fn progress_bar(total: usize) -> Result<ProgressBar> {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    Ok(bar)
}

/// Stamp `value` with the schema version and this invocation.
pub fn envelope<T>(value: T) -> Envelope<T> {
    let cli_args: Vec<String> = std::env::args().collect();
    Envelope::new(value, &cli_args)
}
