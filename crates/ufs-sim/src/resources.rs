//! ---
//! ufs_section: "11-simulation"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Static resource metrics and series-wide summary figures."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use ufs_common::{EnergyEfficiencyConfig, WaterManagementConfig};

use crate::alerts::{Alert, AlertLevel};
use crate::reading::Reading;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterManagement {
    pub recycling_efficiency: f64,
    pub water_quality: f64,
    pub ph_level: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyEfficiency {
    pub led_efficiency: f64,
    pub renewable_energy_use: f64,
}

/// Farm-level efficiency figures shown beside the live readings. Constant for
/// a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetrics {
    pub water: WaterManagement,
    pub energy: EnergyEfficiency,
}

impl ResourceMetrics {
    pub fn from_config(water: &WaterManagementConfig, energy: &EnergyEfficiencyConfig) -> Self {
        Self {
            water: WaterManagement {
                recycling_efficiency: water.recycling_efficiency,
                water_quality: water.water_quality,
                ph_level: water.ph_level,
            },
            energy: EnergyEfficiency {
                led_efficiency: energy.led_efficiency,
                renewable_energy_use: energy.renewable_energy_use,
            },
        }
    }
}

impl Default for ResourceMetrics {
    fn default() -> Self {
        Self::from_config(
            &WaterManagementConfig::default(),
            &EnergyEfficiencyConfig::default(),
        )
    }
}

/// Mean conditions over the whole series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesAverages {
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
}

impl SeriesAverages {
    pub fn of(series: &[Reading]) -> Self {
        if series.is_empty() {
            return Self::default();
        }
        let n = series.len() as f64;
        let (t, h, s) = series.iter().fold((0.0, 0.0, 0.0), |(t, h, s), r| {
            (t + r.temperature, h + r.humidity, s + r.soil_moisture)
        });
        Self {
            temperature: t / n,
            humidity: h / n,
            soil_moisture: s / n,
        }
    }
}

/// Overview card figures: series averages plus counts of open problems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    pub averages: SeriesAverages,
    pub warnings: usize,
    pub errors: usize,
}

impl SeriesSummary {
    pub fn new(averages: SeriesAverages, alerts: &[Alert]) -> Self {
        let count = |level| alerts.iter().filter(|a| a.level == level).count();
        Self {
            averages,
            warnings: count(AlertLevel::Warning),
            errors: count(AlertLevel::Error),
        }
    }

    pub fn all_good(&self) -> bool {
        self.warnings == 0 && self.errors == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::AlertKind;
    use crate::generator::SeriesGenerator;
    use chrono::Utc;

    #[test]
    fn defaults_match_dashboard_figures() {
        let metrics = ResourceMetrics::default();
        assert_eq!(metrics.water.recycling_efficiency, 85.0);
        assert_eq!(metrics.water.water_quality, 92.0);
        assert_eq!(metrics.water.ph_level, 6.5);
        assert_eq!(metrics.energy.led_efficiency, 90.0);
        assert_eq!(metrics.energy.renewable_energy_use, 65.0);
    }

    #[test]
    fn averages_span_whole_series() {
        let mut series = SeriesGenerator::new(7).samples(2).generate();
        series[0].temperature = 20.0;
        series[1].temperature = 30.0;
        let averages = SeriesAverages::of(&series);
        assert_eq!(averages.temperature, 25.0);
        assert_eq!(SeriesAverages::of(&[]), SeriesAverages::default());
    }

    #[test]
    fn summary_counts_problems_only() {
        let now = Utc::now();
        let alerts = vec![
            Alert::from_kind(AlertKind::WaterCritical, now),
            Alert::from_kind(AlertKind::HighTemperature, now),
            Alert::from_kind(AlertKind::HarvestReady, now),
        ];
        let summary = SeriesSummary::new(SeriesAverages::default(), &alerts);
        assert_eq!((summary.warnings, summary.errors), (1, 1));
        assert!(!summary.all_good());
        assert!(SeriesSummary::new(SeriesAverages::default(), &alerts[2..]).all_good());
    }
}
