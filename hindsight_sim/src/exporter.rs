//! JSON exporter for run reports.
//!
//! Writes the full per-cell record plus summary as JSON for downstream
//! analysis tooling (correlation against ground-truth series lives outside
//! this repository).

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

use crate::runner::RunReport;

/// Complete export of one grid run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunExport {
    /// Experiment label (e.g. "time_aware" or "static")
    pub experiment: String,

    /// Master seed used
    pub seed: u64,

    /// Decay rate the run was configured with
    pub decay_rate: f64,

    /// The full report: cells and summary
    pub report: RunReport,
}

impl RunExport {
    /// Wraps a report for export.
    pub fn new(experiment: &str, decay_rate: f64, report: RunReport) -> Self {
        Self {
            experiment: experiment.to_string(),
            seed: report.seed,
            decay_rate,
            report,
        }
    }

    /// Writes to a pretty-printed JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
