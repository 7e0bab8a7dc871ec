//! Writing results to disk.
//!
//! A report is written either as one JSON document or as JSON Lines with one
//! [`RunRecord`] per line. Results that are not part of a report (a single
//! solve, a scaling fit) are wrapped in an [`Envelope`] so they carry the
//! same schema and invocation stamp as a report.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{BenchError, BenchResult};
use crate::report::{ExperimentReport, RunRecord};
use crate::reproducibility::SCHEMA_VERSION;

/// Layout of a written report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// The whole report as one document.
    #[default]
    Json,
    /// One run record per line; the report header is dropped.
    JsonLines,
}

impl ExportFormat {
    /// `.jsonl` / `.ndjson` select JSON Lines, anything else JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("jsonl" | "ndjson") => ExportFormat::JsonLines,
            _ => ExportFormat::Json,
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Pretty-print JSON documents. Ignored for JSON Lines.
    pub pretty: bool,
    #[serde(default)]
    pub format: ExportFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            format: ExportFormat::Json,
        }
    }
}

impl ExportConfig {
    /// Default settings with the format picked from `path`.
    pub fn for_path(path: &Path) -> Self {
        Self {
            format: ExportFormat::from_path(path),
            ..Self::default()
        }
    }
}

/// A standalone result stamped with the schema and the invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub schema_version: String,
    pub aegis_version: String,
    #[serde(default)]
    pub cli_args: Vec<String>,
    pub result: T,
}

impl<T> Envelope<T> {
    pub fn new(result: T, cli_args: &[String]) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.into(),
            aegis_version: env!("CARGO_PKG_VERSION").to_string(),
            cli_args: cli_args.to_vec(),
            result,
        }
    }
}

/// Serialize `value` as one JSON document.
pub fn to_json<T: Serialize>(value: &T, config: &ExportConfig) -> BenchResult<String> {
    let json = if config.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Render `report` in the configured format.
pub fn render_report(report: &ExperimentReport, config: &ExportConfig) -> BenchResult<String> {
    match config.format {
        ExportFormat::Json => to_json(report, config),
        ExportFormat::JsonLines => {
            let mut out = String::new();
            for record in &report.records {
                out.push_str(&serde_json::to_string(record)?);
                out.push('\n');
            }
            Ok(out)
        }
    }
}

/// Write `value` as a JSON document to `path`, creating parent directories.
pub fn to_file<T: Serialize>(value: &T, path: &Path, config: &ExportConfig) -> BenchResult<()> {
    write(path, &to_json(value, config)?)
}

/// Write `report` to `path` in the configured format.
pub fn write_report(
    report: &ExperimentReport,
    path: &Path,
    config: &ExportConfig,
) -> BenchResult<()> {
    write(path, &render_report(report, config)?)
}

fn write(path: &Path, contents: &str) -> BenchResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| BenchError::Io(format!("Failed to create {}: {}", parent.display(), e)))?;
    }
    std::fs::write(path, contents)
        .map_err(|e| BenchError::Io(format!("Failed to write {}: {}", path.display(), e)))
}

fn read(path: &Path) -> BenchResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| BenchError::Io(format!("Failed to read {}: {}", path.display(), e)))
}

/// Read a report written as a JSON document.
///
/// A report from another schema version is still parsed when its fields
/// line up, with a warning.
pub fn read_report(path: &Path) -> BenchResult<ExperimentReport> {
    let report: ExperimentReport = serde_json::from_str(&read(path)?)?;
    if report.reproducibility.schema_version != SCHEMA_VERSION {
        warn!(
            path = %path.display(),
            found = %report.reproducibility.schema_version,
            expected = SCHEMA_VERSION,
            "report schema version differs"
        );
    }
    Ok(report)
}

/// Read run records written as JSON Lines. Blank lines are skipped.
pub fn read_records(path: &Path) -> BenchResult<Vec<RunRecord>> {
    read(path)?
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map_err(|e| BenchError::Export(format!("{}:{}: {}", path.display(), i + 1, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_config_default() {
        let config = ExportConfig::default();
        assert!(config.pretty);
        assert_eq!(config.format, ExportFormat::Json);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ExportConfig::for_path(Path::new("out/runs.jsonl")).format,
            ExportFormat::JsonLines
        );
        assert_eq!(ExportFormat::from_path(Path::new("x.ndjson")), ExportFormat::JsonLines);
        assert_eq!(ExportFormat::from_path(Path::new("report.json")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("report")), ExportFormat::Json);
    }

    #[test]
    fn test_compact_is_single_line() {
        let config = ExportConfig {
            pretty: false,
            ..Default::default()
        };
        let json = to_json(&vec![1, 2, 3], &config).unwrap();
        assert_eq!(json, "[1,2,3]");
    }

    #[test]
    fn test_envelope_stamps_schema() {
        let env = Envelope::new(4.5, &["aegis".to_string(), "solve".to_string()]);
        let json = to_json(&env, &ExportConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert_eq!(value["result"], 4.5);
        assert_eq!(value["cli_args"][1], "solve");
    }
}
