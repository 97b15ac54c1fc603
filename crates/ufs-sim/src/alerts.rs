//! ---
//! ufs_section: "11-simulation"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Threshold rules that turn readings into alerts."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
//! Alert rules.
//!
//! Rules run in a fixed order against a single reading. Each rule belongs to an
//! [`AlertKind`] and fires at most once while an alert of that kind is in the
//! log; dismissing the alert or restarting re-arms it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::notify::Notification;
use crate::reading::Reading;

pub const WATER_CRITICAL_LEVEL: f64 = 25.0;
pub const WATER_LOW_LEVEL: f64 = 40.0;
pub const TEMPERATURE_CEILING: f64 = 28.0;
pub const SOIL_MOISTURE_FLOOR: f64 = 40.0;
pub const HARVEST_WINDOW: std::ops::Range<f64> = 80.0..85.0;
pub const FULL_GROWTH_LEVEL: f64 = 98.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum AlertLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum AlertKind {
    WaterCritical,
    WaterLow,
    HighTemperature,
    LowSoilMoisture,
    HarvestReady,
    FullyGrown,
    SimulationComplete,
}

impl AlertKind {
    pub fn level(self) -> AlertLevel {
        match self {
            AlertKind::WaterCritical => AlertLevel::Error,
            AlertKind::WaterLow | AlertKind::HighTemperature | AlertKind::LowSoilMoisture => {
                AlertLevel::Warning
            }
            AlertKind::HarvestReady | AlertKind::FullyGrown | AlertKind::SimulationComplete => {
                AlertLevel::Info
            }
        }
    }

    /// Message used when the rule fires during playback.
    pub fn message(self) -> &'static str {
        match self {
            AlertKind::WaterCritical => "Water level critical. Refill required!",
            AlertKind::WaterLow => "Water level low. Consider refilling soon.",
            AlertKind::HighTemperature => "Temperature above optimal range",
            AlertKind::LowSoilMoisture => "Soil moisture low. Watering recommended.",
            AlertKind::HarvestReady => "Plants ready for harvest!",
            AlertKind::FullyGrown => "Plants have fully grown to 100%!",
            AlertKind::SimulationComplete => "Simulation completed",
        }
    }

    /// Substring the dashboard used to match alerts of this kind in stored
    /// alert logs.
    pub fn legacy_key(self) -> &'static str {
        match self {
            AlertKind::WaterCritical => "Water level critical",
            AlertKind::WaterLow => "Water level low",
            AlertKind::HighTemperature => "temperature",
            AlertKind::LowSoilMoisture => "soil moisture",
            AlertKind::HarvestReady => "ready for harvest",
            AlertKind::FullyGrown => "fully grown",
            AlertKind::SimulationComplete => "Simulation completed",
        }
    }

    /// Best-effort kind for an alert record that carries only text.
    pub fn infer(level: AlertLevel, message: &str) -> Option<Self> {
        let lower = message.to_lowercase();
        [
            AlertKind::WaterCritical,
            AlertKind::WaterLow,
            AlertKind::HighTemperature,
            AlertKind::LowSoilMoisture,
            AlertKind::HarvestReady,
            AlertKind::FullyGrown,
            AlertKind::SimulationComplete,
        ]
        .into_iter()
        .find(|kind| kind.level() == level && lower.contains(&kind.legacy_key().to_lowercase()))
    }

    fn notification(self) -> Option<Notification> {
        match self {
            AlertKind::WaterCritical => {
                Some(Notification::error("Critical: Water level too low!").high_priority())
            }
            AlertKind::HighTemperature => Some(Notification::warning("Warning: Temperature too high")),
            AlertKind::HarvestReady => Some(Notification::success("Plants are ready for harvest!")),
            AlertKind::FullyGrown => {
                Some(Notification::success("Plants have reached full growth!").high_priority())
            }
            AlertKind::WaterLow | AlertKind::LowSoilMoisture | AlertKind::SimulationComplete => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    /// `None` for recorded alerts whose rule could not be recognised; those
    /// stay in the log but never suppress a rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<AlertKind>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    pub fn new(kind: AlertKind, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            level: kind.level(),
            kind: Some(kind),
            message: message.into(),
            timestamp,
        }
    }

    /// Alert without a known rule, kept as recorded.
    pub fn untagged(level: AlertLevel, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            level,
            kind: None,
            message: message.into(),
            timestamp,
        }
    }

    /// Alert carrying the kind's standard message.
    pub fn from_kind(kind: AlertKind, timestamp: DateTime<Utc>) -> Self {
        Self::new(kind, kind.message(), timestamp)
    }
}

/// Result of running the rules over one reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Full alert log after this evaluation, newest first.
    pub alerts: Vec<Alert>,
    /// Kinds raised by this evaluation, in rule order.
    pub raised: Vec<AlertKind>,
    pub notifications: Vec<Notification>,
}

impl Evaluation {
    pub fn changed(&self) -> bool {
        !self.raised.is_empty()
    }

    fn raise(&mut self, kind: AlertKind, at: DateTime<Utc>) -> bool {
        if self.alerts.iter().any(|alert| alert.kind == Some(kind)) {
            return false;
        }
        self.alerts.insert(0, Alert::from_kind(kind, at));
        self.raised.push(kind);
        if let Some(note) = kind.notification() {
            self.notifications.push(note);
        }
        true
    }
}

/// Apply the alert rules to `reading` against the current alert log.
///
/// Pure: the input log is not modified. New alerts are stamped with the
/// reading's timestamp and prepended.
pub fn evaluate(reading: &Reading, current: &[Alert]) -> Evaluation {
    let at = reading.timestamp;
    let mut eval = Evaluation {
        alerts: current.to_vec(),
        raised: Vec::new(),
        notifications: Vec::new(),
    };

    // Low water is the else branch of critical: skipped only when critical
    // actually fired on this reading.
    let critical_fired =
        reading.water_level <= WATER_CRITICAL_LEVEL && eval.raise(AlertKind::WaterCritical, at);
    if !critical_fired && reading.water_level <= WATER_LOW_LEVEL {
        eval.raise(AlertKind::WaterLow, at);
    }
    if reading.temperature > TEMPERATURE_CEILING {
        eval.raise(AlertKind::HighTemperature, at);
    }
    if reading.soil_moisture < SOIL_MOISTURE_FLOOR {
        eval.raise(AlertKind::LowSoilMoisture, at);
    }
    if HARVEST_WINDOW.contains(&reading.growth_level) {
        eval.raise(AlertKind::HarvestReady, at);
    }
    if reading.growth_level >= FULL_GROWTH_LEVEL {
        eval.raise(AlertKind::FullyGrown, at);
    }
    eval
}
