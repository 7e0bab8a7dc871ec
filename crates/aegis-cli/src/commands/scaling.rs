//! Scaling command implementation.
//!
//! `aegis scaling --min 4 --max 12`

use anyhow::{Result, bail};
use console::style;

use aegis_bench::{ScenarioTemplate, fit_exponential_growth, time_brute_force};

use super::common::{emit_json, envelope, spinner};

/// Execute the scaling command.
pub fn execute(
    min: usize,
    max: usize,
    repeats: usize,
    seed: u64,
    output: Option<&str>,
) -> Result<()> {
    if min == 0 || max <= min {
        bail!("Need 1 <= min < max, got min={min} max={max}");
    }
    let template = ScenarioTemplate {
        seed,
        ..ScenarioTemplate::default()
    };

    let progress = spinner(format!("timing brute force for N = {min}..={max}"))?;
    let points = time_brute_force(min..=max, &template, repeats);
    progress.finish_and_clear();
    let points = points?;
    let fit = fit_exponential_growth(&points)?;

    let timings: Vec<_> = points
        .iter()
        .map(|(n, t)| serde_json::json!({ "n": n, "seconds": t }))
        .collect();
    emit_json(
        &envelope(serde_json::json!({ "timings": timings, "fit": fit })),
        output,
    )?;

    eprintln!();
    eprintln!("{}", style("Brute-Force Scaling").bold().underlined());
    for (n, t) in &points {
        eprintln!("  N={n:<3} {:>12.3} µs", t * 1e6);
    }
    eprintln!(
        "  Fit:         t ∝ {:.3}^N (slope {:.3} log₂s/var, R² = {:.4})",
        fit.base, fit.slope, fit.r_squared
    );
    Ok(())
}
