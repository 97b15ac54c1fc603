//! ---
//! ufs_section: "11-simulation"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Reading model shared by the data source and the playback engine."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

/// One sensor sample of the reading series.
///
/// Growth and consumption travel as decimal strings in series files; they are
/// parsed once on load.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Percent.
    pub soil_moisture: f64,
    /// Lux.
    pub light_intensity: f64,
    /// Parts per million.
    pub co2_level: f64,
    /// Reservoir fill, percent.
    pub water_level: f64,
    /// Crop growth, percent.
    #[serde_as(as = "DisplayFromStr")]
    pub growth_level: f64,
    /// Suggested actuator states. Display only; never drives the gate.
    #[serde(default)]
    pub actuators: ActuatorHints,
    pub consumption: Consumption,
}

/// Actuator suggestions recorded alongside a reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActuatorHints {
    pub water_pump: bool,
    pub grow_lights: bool,
    pub ventilation: bool,
    pub nutrient_dispenser: bool,
}

/// Cumulative resource usage since the start of the series.
#[serde_as]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Consumption {
    /// Kilowatt-hours.
    #[serde_as(as = "DisplayFromStr")]
    pub energy: f64,
    /// Liters.
    #[serde_as(as = "DisplayFromStr")]
    pub water: f64,
}
