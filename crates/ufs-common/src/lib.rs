//! ---
//! ufs_section: "01-core-functionality"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Shared primitives and utilities for the dashboard runtime."
//! ufs_version: "v0.0.0-prealpha"
//! ufs_owner: "tbd"
//! ---
//! Shared primitives for the UrbanFarm workspace: configuration loading,
//! tracing setup, and tick timing helpers.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod time;

pub use config::{
    AppConfig, EnergyEfficiencyConfig, LoadedAppConfig, LoggingConfig, ProfileConfig,
    ReportConfig, SimulationConfig, WaterManagementConfig, SUPPORTED_SPEEDS,
};
pub use logging::{init_tracing, LogFormat, LogGuard};
pub use metrics::{JitterHistogram, JitterSummary, TickTimingReporter};

/// Workspace version string reported by binaries.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
