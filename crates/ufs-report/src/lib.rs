//! ---
//! ufs_section: "08-reporting"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Simulation report rendering and export."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
//! Text report summarising a simulation session.

pub mod errors;
pub mod exporter;
pub mod report;

pub use errors::{ReportError, Result};
pub use exporter::ReportExporter;
pub use report::{SimulationReport, REPORT_TITLE};
