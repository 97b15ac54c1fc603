//! ---
//! ufs_section: "08-reporting"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Simulation report rendering and export."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::{ReportError, Result};
use crate::report::SimulationReport;

/// Writes a rendered report into an output directory.
#[derive(Debug)]
pub struct ReportExporter<'a> {
    report: &'a SimulationReport,
}

impl<'a> ReportExporter<'a> {
    pub fn new(report: &'a SimulationReport) -> Self {
        Self { report }
    }

    /// Write the report as `output_dir/file_name`, replacing any earlier
    /// download, and return the path written.
    pub fn export(&self, output_dir: &Path, file_name: &str) -> Result<PathBuf> {
        if file_name.trim().is_empty() || file_name.contains(['/', '\\']) {
            return Err(ReportError::InvalidFileName(file_name.to_string()));
        }
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        let path = output_dir.join(file_name);
        fs::write(&path, self.report.render()).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;

        info!(
            path = %path.display(),
            alerts = self.report.alerts.len(),
            "report exported"
        );
        Ok(path)
    }
}
