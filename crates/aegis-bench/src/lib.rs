//! Experiment harness for the Aegis solver comparison.
//!
//! Sequences solver runs across problem sizes, noise profiles and optimizers
//! and collects the raw results:
//! - [`ExperimentPlan`]: what to run, loadable from YAML or JSON
//! - [`ExperimentHarness`]: runs a plan sequentially into an [`ExperimentReport`]
//! - [`fit_exponential_growth`]: scaling fit for timing sweeps
//! - [`export`]: JSON output with a reproducibility block
//!
//! ```rust
//! use aegis_bench::{ExperimentHarness, ExperimentPlan};
//!
//! let plan = ExperimentPlan::scaling_sweep([3, 4]);
//! let report = ExperimentHarness::new().run(&plan).unwrap();
//! assert_eq!(report.records.len(), plan.total_runs());
//! ```

pub mod error;
pub mod export;
pub mod harness;
pub mod plan;
pub mod report;
pub mod reproducibility;
pub mod scaling;

pub use error::{BenchError, BenchResult};
pub use export::{
    Envelope, ExportConfig, ExportFormat, read_records, read_report, render_report, to_file,
    to_json, write_report,
};
pub use harness::ExperimentHarness;
pub use plan::{ClassicalSolver, ExperimentPlan, ScenarioTemplate};
pub use report::{ExperimentReport, RunOutcome, RunRecord};
pub use reproducibility::{ReproducibilityInfo, SCHEMA_VERSION};
pub use scaling::{GrowthFit, fit_exponential_growth, time_brute_force};
