//! ---
//! ufs_section: "01-core-functionality"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Session runtime and lifecycle management."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use anyhow::{Context, Result};
use tracing::info;
use ufs_common::config::AppConfig;
use ufs_sim::DataSource;

use crate::session::{SessionConfig, SessionHandle, SessionRuntime};

/// Load the configured series and spawn a session around it.
pub fn launch(config: &AppConfig) -> Result<SessionHandle> {
    let session_config =
        SessionConfig::from_app_config(config).context("invalid session configuration")?;
    let mut bundle = DataSource::from_config(&config.simulation)
        .load()
        .context("failed to load reading series")?;
    if !config.simulation.seed_initial_alerts {
        bundle = bundle.without_alerts();
    }
    let handle = SessionRuntime::spawn(bundle, session_config)
        .context("failed to start session runtime")?;
    info!(session = %handle.id(), "session launched");
    Ok(handle)
}
