//! ---
//! ufs_section: "11-simulation"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Loading and exporting recorded reading series."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use std::fs;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::alerts::{Alert, AlertKind, AlertLevel};
use crate::error::SeriesError;
use crate::reading::{ActuatorHints, Consumption, Reading};

/// Flat CSV row for a reading.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadingRecord {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub light_intensity: f64,
    pub co2_level: f64,
    pub water_level: f64,
    pub growth_level: f64,
    #[serde(default)]
    pub water_pump: bool,
    #[serde(default)]
    pub grow_lights: bool,
    #[serde(default)]
    pub ventilation: bool,
    #[serde(default)]
    pub nutrient_dispenser: bool,
    pub energy: f64,
    pub water: f64,
}

impl From<ReadingRecord> for Reading {
    fn from(raw: ReadingRecord) -> Self {
        Reading {
            timestamp: raw.timestamp,
            temperature: raw.temperature,
            humidity: raw.humidity,
            soil_moisture: raw.soil_moisture,
            light_intensity: raw.light_intensity,
            co2_level: raw.co2_level,
            water_level: raw.water_level,
            growth_level: raw.growth_level,
            actuators: ActuatorHints {
                water_pump: raw.water_pump,
                grow_lights: raw.grow_lights,
                ventilation: raw.ventilation,
                nutrient_dispenser: raw.nutrient_dispenser,
            },
            consumption: Consumption {
                energy: raw.energy,
                water: raw.water,
            },
        }
    }
}

impl From<&Reading> for ReadingRecord {
    fn from(reading: &Reading) -> Self {
        ReadingRecord {
            timestamp: reading.timestamp,
            temperature: reading.temperature,
            humidity: reading.humidity,
            soil_moisture: reading.soil_moisture,
            light_intensity: reading.light_intensity,
            co2_level: reading.co2_level,
            water_level: reading.water_level,
            growth_level: reading.growth_level,
            water_pump: reading.actuators.water_pump,
            grow_lights: reading.actuators.grow_lights,
            ventilation: reading.actuators.ventilation,
            nutrient_dispenser: reading.actuators.nutrient_dispenser,
            energy: reading.consumption.energy,
            water: reading.consumption.water,
        }
    }
}

/// Alert as stored next to a recorded series. Older files carry no kind.
#[derive(Debug, Serialize, Deserialize)]
struct AlertRecord {
    level: AlertLevel,
    #[serde(default)]
    kind: Option<AlertKind>,
    message: String,
    timestamp: DateTime<Utc>,
}

impl AlertRecord {
    fn into_alert(self) -> Alert {
        let kind = self
            .kind
            .or_else(|| AlertKind::infer(self.level, &self.message));
        if kind.is_none() {
            warn!(
                level = %self.level,
                message = %self.message,
                "recorded alert matches no rule; keeping it untagged"
            );
        }
        Alert {
            kind,
            ..Alert::untagged(self.level, self.message, self.timestamp)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonSeries {
    Bundle {
        readings: Vec<Reading>,
        #[serde(default)]
        alerts: Vec<AlertRecord>,
    },
    Plain(Vec<Reading>),
}

/// A recorded series: readings in order plus any bundled alert records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesFile {
    pub readings: Vec<Reading>,
    pub alerts: Vec<Alert>,
}

impl SeriesFile {
    pub fn new(readings: Vec<Reading>, alerts: Vec<Alert>) -> Self {
        Self { readings, alerts }
    }

    /// Load a `.json` or `.csv` series. CSV files carry readings only.
    pub fn load(path: &Path) -> Result<Self> {
        let series = match extension(path) {
            Some("json") => Self::from_json(path)?,
            Some("csv") => Self::from_csv(path)?,
            _ => return Err(SeriesError::UnsupportedFormat(path.to_path_buf()).into()),
        };
        if series.readings.is_empty() {
            return Err(SeriesError::NoReadings(path.to_path_buf()).into());
        }
        Ok(series)
    }

    /// Write the series in the format implied by the file extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        match extension(path) {
            Some("json") => self.save_json(path),
            Some("csv") => self.save_csv(path),
            _ => Err(SeriesError::UnsupportedFormat(path.to_path_buf()).into()),
        }
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = fs::File::create(path)
            .with_context(|| format!("unable to create series file {}", path.display()))?;
        let writer = BufWriter::new(file);
        let written = if self.alerts.is_empty() {
            serde_json::to_writer_pretty(writer, &self.readings)
        } else {
            let alerts: Vec<_> = self
                .alerts
                .iter()
                .map(|alert| AlertRecord {
                    level: alert.level,
                    kind: alert.kind,
                    message: alert.message.clone(),
                    timestamp: alert.timestamp,
                })
                .collect();
            serde_json::to_writer_pretty(
                writer,
                &serde_json::json!({ "readings": self.readings, "alerts": alerts }),
            )
        };
        written.with_context(|| format!("unable to write series JSON {}", path.display()))
    }

    pub fn save_csv(&self, path: &Path) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .has_headers(true)
            .from_path(path)
            .with_context(|| format!("unable to create series csv {}", path.display()))?;
        for reading in &self.readings {
            writer
                .serialize(ReadingRecord::from(reading))
                .with_context(|| format!("unable to write series row to {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("unable to flush series csv {}", path.display()))
    }

    fn from_json(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read series file {}", path.display()))?;
        let parsed: JsonSeries = serde_json::from_str(&contents)
            .with_context(|| format!("invalid series JSON {}", path.display()))?;
        Ok(match parsed {
            JsonSeries::Plain(readings) => Self::new(readings, Vec::new()),
            JsonSeries::Bundle { readings, alerts } => Self::new(
                readings,
                alerts.into_iter().map(AlertRecord::into_alert).collect(),
            ),
        })
    }

    fn from_csv(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)
            .with_context(|| format!("unable to open series csv {}", path.display()))?;
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
        let mut readings = Vec::new();
        for row in reader.deserialize::<ReadingRecord>() {
            let raw = row.with_context(|| format!("invalid series row in {}", path.display()))?;
            readings.push(Reading::from(raw));
        }
        Ok(Self::new(readings, Vec::new()))
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}
