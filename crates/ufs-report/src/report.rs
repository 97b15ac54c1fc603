//! ---
//! ufs_section: "08-reporting"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Simulation report rendering and export."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use std::fmt::{self, Write as _};

use chrono::{DateTime, Utc};
use ufs_common::time::display_timestamp;
use ufs_sim::{Alert, EngineSnapshot, Reading, ResourceMetrics};

pub const REPORT_TITLE: &str = "Smart Urban Farming System - Simulation Report";

/// Everything the report prints, captured at download time.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub generated_at: DateTime<Utc>,
    /// Reading at the playback cursor.
    pub reading: Reading,
    pub resources: ResourceMetrics,
    /// Alert log in engine order, newest first.
    pub alerts: Vec<Alert>,
}

impl SimulationReport {
    pub fn from_snapshot(snapshot: &EngineSnapshot, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            reading: snapshot.reading.clone(),
            resources: snapshot.resources,
            alerts: snapshot.alerts.clone(),
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.reading;
        let water = &self.resources.water;
        let energy = &self.resources.energy;

        let mut out = String::new();
        writeln!(out, "{REPORT_TITLE}")?;
        writeln!(out, "Generated: {}", display_timestamp(&self.generated_at))?;
        writeln!(out)?;

        writeln!(out, "SIMULATION SUMMARY")?;
        writeln!(out, "----------------")?;
        writeln!(out, "Plant Growth: {:.1}%", r.growth_level)?;
        writeln!(out, "Final Temperature: {:.1}°C", r.temperature)?;
        writeln!(out, "Final Humidity: {:.1}%", r.humidity)?;
        writeln!(out, "Final Soil Moisture: {:.1}%", r.soil_moisture)?;
        writeln!(out, "Final Water Level: {:.1}%", r.water_level)?;
        writeln!(out, "Total Energy Consumption: {:.2} kWh", r.consumption.energy)?;
        writeln!(out, "Total Water Consumption: {:.2} liters", r.consumption.water)?;
        writeln!(out)?;

        writeln!(out, "WATER MANAGEMENT METRICS")?;
        writeln!(out, "----------------------")?;
        writeln!(out, "Water Recycling Efficiency: {}%", water.recycling_efficiency)?;
        writeln!(out, "Water Quality: {}%", water.water_quality)?;
        writeln!(out, "pH Level: {}", water.ph_level)?;
        writeln!(out)?;

        writeln!(out, "ENERGY EFFICIENCY METRICS")?;
        writeln!(out, "------------------------")?;
        writeln!(out, "LED Lighting Efficiency: {}%", energy.led_efficiency)?;
        writeln!(out, "Renewable Energy Usage: {}%", energy.renewable_energy_use)?;
        writeln!(out)?;

        writeln!(out, "ALERTS LOG")?;
        writeln!(out, "----------")?;
        for alert in &self.alerts {
            writeln!(
                out,
                "[{}] {}: {}",
                alert.level,
                display_timestamp(&alert.timestamp),
                alert.message
            )?;
        }
        f.write_str(&out)
    }
}
