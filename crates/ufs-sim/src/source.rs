//! ---
//! ufs_section: "11-simulation"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Selects where the session's reading series comes from."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use ufs_common::SimulationConfig;

use crate::alerts::Alert;
use crate::generator::SeriesGenerator;
use crate::reading::Reading;
use crate::replay::SeriesFile;

/// Origin of the reading series.
#[derive(Debug, Clone)]
pub enum DataSource {
    Generated(SeriesGenerator),
    File(PathBuf),
}

/// Immutable series plus the alert records that ship with it.
#[derive(Debug, Clone)]
pub struct SeriesBundle {
    pub readings: Arc<[Reading]>,
    pub initial_alerts: Vec<Alert>,
}

impl SeriesBundle {
    pub fn without_alerts(mut self) -> Self {
        self.initial_alerts.clear();
        self
    }
}

impl DataSource {
    pub fn from_config(config: &SimulationConfig) -> Self {
        match &config.series_file {
            Some(path) => DataSource::File(path.clone()),
            None => DataSource::Generated(SeriesGenerator::from_config(config)),
        }
    }

    pub fn load(&self) -> Result<SeriesBundle> {
        let bundle = match self {
            DataSource::Generated(generator) => SeriesBundle {
                readings: generator.generate().into(),
                initial_alerts: generator.initial_alerts(),
            },
            DataSource::File(path) => {
                let file = SeriesFile::load(path)
                    .with_context(|| format!("unable to load series {}", path.display()))?;
                SeriesBundle {
                    readings: file.readings.into(),
                    initial_alerts: file.alerts,
                }
            }
        };
        info!(
            readings = bundle.readings.len(),
            alerts = bundle.initial_alerts.len(),
            source = self.label(),
            "reading series loaded"
        );
        Ok(bundle)
    }

    fn label(&self) -> &'static str {
        match self {
            DataSource::Generated(_) => "generated",
            DataSource::File(_) => "file",
        }
    }
}
