//! ---
//! ufs_section: "01-core-functionality"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Shared primitives and utilities for the dashboard runtime."
//! ufs_version: "v0.0.0-prealpha"
//! ufs_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use tracing::debug;

use crate::logging::LogFormat;

/// Playback multipliers the dashboard exposes.
pub const SUPPORTED_SPEEDS: [u32; 4] = [1, 5, 10, 50];

/// Longest generated series, in minutes from the first reading (one leap year).
pub const MAX_SERIES_SPAN_MINUTES: u64 = 366 * 24 * 60;

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_speed() -> u32 {
    5
}

fn default_seed() -> u64 {
    0x5EED_FA4Du64
}

fn default_samples() -> usize {
    288
}

fn default_interval_minutes() -> u32 {
    5
}

fn default_series_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 6, 8, 0, 0)
        .single()
        .unwrap_or_default()
}

fn default_true() -> bool {
    true
}

fn default_queue_depth() -> usize {
    64
}

fn default_shutdown_grace() -> Duration {
    Duration::from_millis(500)
}

fn default_profile_path() -> PathBuf {
    PathBuf::from("target/state/local-storage.json")
}

fn default_report_directory() -> PathBuf {
    PathBuf::from("target/reports")
}

fn default_report_file_name() -> String {
    "farming-simulation-report.txt".to_owned()
}

/// Primary configuration object for the dashboard runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "UFS_CONFIG";

    /// Load configuration from disk, respecting the `UFS_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration together with the effective source path.
    ///
    /// An empty candidate list, or one where no candidate exists, yields
    /// [`AppConfig::default`] with `source = None`.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        debug!(
            inspected = %candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            "no configuration file found; using defaults"
        );
        Ok(LoadedAppConfig {
            config: AppConfig::default(),
            source: None,
        })
    }

    fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.report.validate()?;
        Ok(())
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Initial playback multiplier.
    #[serde(default = "default_speed")]
    pub speed: u32,
    /// Pre-recorded series (JSON or CSV). The deterministic generator is used
    /// when unset.
    #[serde(default)]
    pub series_file: Option<PathBuf>,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
    #[serde(default = "default_series_start")]
    pub start: DateTime<Utc>,
    /// Start the session with the data source's bundled alert records.
    #[serde(default = "default_true")]
    pub seed_initial_alerts: bool,
    /// Capacity of the session command queue.
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
    #[serde(default = "default_shutdown_grace")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub shutdown_grace: Duration,
    #[serde(default)]
    pub water: WaterManagementConfig,
    #[serde(default)]
    pub energy: EnergyEfficiencyConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            series_file: None,
            seed: default_seed(),
            samples: default_samples(),
            interval_minutes: default_interval_minutes(),
            start: default_series_start(),
            seed_initial_alerts: true,
            queue_depth: default_queue_depth(),
            shutdown_grace: default_shutdown_grace(),
            water: WaterManagementConfig::default(),
            energy: EnergyEfficiencyConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_SPEEDS.contains(&self.speed) {
            return Err(anyhow!(
                "simulation speed {} is not one of {:?}",
                self.speed,
                SUPPORTED_SPEEDS
            ));
        }
        if self.series_file.is_none() && self.samples == 0 {
            return Err(anyhow!("simulation.samples must be greater than zero"));
        }
        if self.interval_minutes == 0 {
            return Err(anyhow!("simulation.interval_minutes must be greater than zero"));
        }
        if self.series_file.is_none() {
            let span = (self.samples as u64)
                .checked_mul(u64::from(self.interval_minutes))
                .filter(|span| *span <= MAX_SERIES_SPAN_MINUTES)
                .ok_or_else(|| {
                    anyhow!(
                        "simulation.samples x interval_minutes exceeds {MAX_SERIES_SPAN_MINUTES} minutes"
                    )
                })?;
            let span = chrono::Duration::minutes(span as i64);
            if self.start.checked_add_signed(span).is_none() {
                return Err(anyhow!(
                    "simulation.start {} leaves no room for the generated series",
                    self.start
                ));
            }
        }
        if self.queue_depth == 0 {
            return Err(anyhow!("simulation.queue_depth must be greater than zero"));
        }
        if !(0.0..=14.0).contains(&self.water.ph_level) {
            return Err(anyhow!(
                "simulation.water.ph_level {} is outside 0-14",
                self.water.ph_level
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterManagementConfig {
    #[serde(default = "WaterManagementConfig::default_recycling")]
    pub recycling_efficiency: f64,
    #[serde(default = "WaterManagementConfig::default_quality")]
    pub water_quality: f64,
    #[serde(default = "WaterManagementConfig::default_ph")]
    pub ph_level: f64,
}

impl WaterManagementConfig {
    fn default_recycling() -> f64 {
        85.0
    }

    fn default_quality() -> f64 {
        92.0
    }

    fn default_ph() -> f64 {
        6.5
    }
}

impl Default for WaterManagementConfig {
    fn default() -> Self {
        Self {
            recycling_efficiency: Self::default_recycling(),
            water_quality: Self::default_quality(),
            ph_level: Self::default_ph(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyEfficiencyConfig {
    #[serde(default = "EnergyEfficiencyConfig::default_led")]
    pub led_efficiency: f64,
    #[serde(default = "EnergyEfficiencyConfig::default_renewable")]
    pub renewable_energy_use: f64,
}

impl EnergyEfficiencyConfig {
    fn default_led() -> f64 {
        90.0
    }

    fn default_renewable() -> f64 {
        65.0
    }
}

impl Default for EnergyEfficiencyConfig {
    fn default() -> Self {
        Self {
            led_efficiency: Self::default_led(),
            renewable_energy_use: Self::default_renewable(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// JSON object file acting as the browser's local key-value record.
    #[serde(default = "default_profile_path")]
    pub store_path: PathBuf,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            store_path: default_profile_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_report_file_name")]
    pub file_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            directory: default_report_directory(),
            file_name: default_report_file_name(),
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> Result<()> {
        let name = self.file_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(anyhow!(
                "report.file_name '{}' must be a bare file name",
                self.file_name
            ));
        }
        Ok(())
    }

    /// Full path of the report artifact.
    pub fn output_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}
