//! Information needed to reproduce an experiment report.

use serde::{Deserialize, Serialize};

/// Version of the report JSON layout.
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Reproducibility block attached to every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReproducibilityInfo {
    /// Aegis version used.
    pub aegis_version: String,
    /// Schema version of the output format.
    pub schema_version: String,
    /// Solver seed of the plan.
    pub seed: u64,
    /// Scenario seed of the plan.
    pub scenario_seed: u64,
    /// Command line that produced the report, if any.
    #[serde(default)]
    pub cli_args: Vec<String>,
}

impl ReproducibilityInfo {
    /// Capture the current context.
    pub fn capture(seed: u64, scenario_seed: u64, cli_args: &[String]) -> Self {
        Self {
            aegis_version: env!("CARGO_PKG_VERSION").to_string(),
            schema_version: SCHEMA_VERSION.into(),
            seed,
            scenario_seed,
            cli_args: cli_args.to_vec(),
        }
    }
}
