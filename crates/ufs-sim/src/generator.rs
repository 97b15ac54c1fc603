//! ---
//! ufs_section: "11-simulation"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Deterministic generator for the 24-hour reading series."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use std::f64::consts::PI;

use chrono::{DateTime, Duration, Timelike, Utc};
use rand::prelude::*;
use rand_distr::Uniform;
use tracing::warn;
use ufs_common::SimulationConfig;

use crate::alerts::{Alert, AlertKind};
use crate::reading::{ActuatorHints, Consumption, Reading};

const SOIL_CYCLE: usize = 24;

/// Builds the simulated day of readings.
///
/// The same seed always yields the same series; the shape follows a diurnal
/// temperature curve, daylight between 06:00 and 20:00, a soil moisture
/// sawtooth reset by watering every 24 samples, and linear growth, reservoir
/// drain and energy use.
#[derive(Debug, Clone)]
pub struct SeriesGenerator {
    seed: u64,
    samples: usize,
    interval: Duration,
    start: DateTime<Utc>,
}

impl SeriesGenerator {
    pub fn new(seed: u64) -> Self {
        let defaults = SimulationConfig::default();
        Self {
            seed,
            samples: defaults.samples,
            interval: Duration::minutes(i64::from(defaults.interval_minutes)),
            start: defaults.start,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.seed)
            .samples(config.samples)
            .interval(Duration::minutes(i64::from(config.interval_minutes)))
            .start(config.start)
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    pub fn generate(&self) -> Vec<Reading> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let unit = Uniform::new(-1.0_f64, 1.0);
        let samples = self.samples.max(1) as f64;

        let readings: Vec<Reading> = (0..self.samples)
            .map_while(|i| {
                let timestamp = self.timestamp_at(i)?;
                let hour = f64::from(timestamp.hour());
                let daylight = (6.0..=20.0).contains(&hour);
                let progress = i as f64 / samples;

                let base_temp = 18.0 + ((hour - 6.0) * PI / 12.0).sin() * 6.0;
                let temperature = base_temp + unit.sample(&mut rng);
                let humidity = 75.0 - (temperature - 18.0) * 2.0 + unit.sample(&mut rng) * 5.0;

                let light_intensity = if daylight {
                    let curve = ((hour - 6.0) * PI / 14.0).sin() * 15_000.0;
                    (curve + unit.sample(&mut rng) * 250.0).max(0.0)
                } else {
                    (unit.sample(&mut rng) + 1.0) * 50.0
                };

                let cycle = i % SOIL_CYCLE;
                let soil_moisture = if cycle == SOIL_CYCLE - 1 {
                    80.0
                } else {
                    80.0 - cycle as f64 * 0.8
                };

                let actuators = ActuatorHints {
                    water_pump: soil_moisture < 65.0,
                    grow_lights: daylight && light_intensity < 5_000.0,
                    ventilation: temperature > 24.0 || humidity > 70.0,
                    nutrient_dispenser: hour == 8.0 || hour == 16.0,
                };

                Some(Reading {
                    timestamp,
                    temperature: round2(temperature),
                    humidity: round2(humidity),
                    soil_moisture: round2(soil_moisture),
                    light_intensity: round2(light_intensity),
                    co2_level: 450.0 + unit.sample(&mut rng) * 25.0,
                    water_level: round2(90.0 - progress * 70.0),
                    growth_level: round2((progress * 100.0).min(100.0)),
                    actuators,
                    consumption: Consumption {
                        energy: round2(progress * 1_000.0),
                        water: ((i / SOIL_CYCLE) * 2) as f64,
                    },
                })
            })
            .collect();
        if readings.len() < self.samples {
            warn!(
                requested = self.samples,
                generated = readings.len(),
                "series truncated at the end of the representable calendar"
            );
        }
        readings
    }

    /// Timestamp of sample `i`, or `None` past the representable range.
    fn timestamp_at(&self, i: usize) -> Option<DateTime<Utc>> {
        let offset = self.interval.checked_mul(i32::try_from(i).ok()?)?;
        self.start.checked_add_signed(offset)
    }

    /// Alert records bundled with the generated series. Records that would
    /// fall outside the representable calendar are left out.
    pub fn initial_alerts(&self) -> Vec<Alert> {
        let at = |hours: i64, minutes: i64| {
            self.start
                .checked_add_signed(Duration::hours(hours) + Duration::minutes(minutes))
        };
        [
            (AlertKind::WaterLow, "Water level low. Refill water tank soon.", at(6, 23)),
            (AlertKind::HarvestReady, AlertKind::HarvestReady.message(), at(22, 15)),
            (AlertKind::HighTemperature, AlertKind::HighTemperature.message(), at(4, 45)),
        ]
        .into_iter()
        .filter_map(|(kind, message, timestamp)| Some(Alert::new(kind, message, timestamp?)))
        .collect()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
