//! ---
//! ufs_section: "11-simulation"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Playback state machine over the fixed reading series."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, info};
use ufs_common::time::tick_period;

use crate::actuators::ActuatorGate;
use crate::alerts::{evaluate, Alert, AlertKind};
use crate::error::{EngineError, Result};
use crate::notify::Notification;
use crate::reading::Reading;
use crate::resources::{ResourceMetrics, SeriesAverages, SeriesSummary};
use crate::source::SeriesBundle;

const STARTED_NOTICE: &str = "Simulation started with optimized water and energy settings";
const COMPLETED_NOTICE: &str = "Simulation complete! Full 24-hour cycle finished.";

/// Playback multiplier. One reading is consumed every `1000 / n` ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Speed {
    X1,
    #[default]
    X5,
    X10,
    X50,
}

impl Speed {
    pub const ALL: [Speed; 4] = [Speed::X1, Speed::X5, Speed::X10, Speed::X50];

    pub fn multiplier(self) -> u32 {
        match self {
            Speed::X1 => 1,
            Speed::X5 => 5,
            Speed::X10 => 10,
            Speed::X50 => 50,
        }
    }

    pub fn tick_period(self) -> Duration {
        tick_period(self.multiplier())
    }
}

impl TryFrom<u32> for Speed {
    type Error = EngineError;

    fn try_from(value: u32) -> Result<Self> {
        Speed::ALL
            .into_iter()
            .find(|speed| speed.multiplier() == value)
            .ok_or(EngineError::UnsupportedSpeed(value))
    }
}

impl From<Speed> for u32 {
    fn from(speed: Speed) -> Self {
        speed.multiplier()
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.multiplier())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlaybackStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// First start since construction or restart.
    Started,
    /// Continued from a pause.
    Resumed,
    /// Completed playback was rewound and started again.
    Restarted,
    AlreadyRunning,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Not running, or already completed.
    Ignored,
    Advanced { index: usize, raised: Vec<AlertKind> },
    Completed { final_growth: f64 },
}

/// Read-only view of the engine handed to presentation and reporting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub status: PlaybackStatus,
    pub is_running: bool,
    pub completed: bool,
    pub speed: Speed,
    pub current_index: usize,
    pub current_time: DateTime<Utc>,
    pub reading: Reading,
    pub alerts: Vec<Alert>,
    pub series_len: usize,
    pub progress_percent: f64,
    pub resources: ResourceMetrics,
    pub summary: SeriesSummary,
}

/// Replays a fixed reading series one tick at a time.
///
/// The engine is synchronous and owns all simulation state. Timers live
/// outside; they call [`PlaybackEngine::tick`] at the period given by the
/// current [`Speed`] while [`PlaybackEngine::is_running`] holds.
#[derive(Debug)]
pub struct PlaybackEngine {
    series: Arc<[Reading]>,
    averages: SeriesAverages,
    resources: ResourceMetrics,
    index: usize,
    completed: bool,
    is_running: bool,
    started: bool,
    speed: Speed,
    current_time: DateTime<Utc>,
    alerts: Vec<Alert>,
    pending: Vec<Notification>,
}

impl PlaybackEngine {
    pub fn new(
        series: impl Into<Arc<[Reading]>>,
        initial_alerts: Vec<Alert>,
        resources: ResourceMetrics,
    ) -> Result<Self> {
        let series = series.into();
        let first = series.first().ok_or(EngineError::EmptySeries)?;
        let current_time = first.timestamp;
        Ok(Self {
            averages: SeriesAverages::of(&series),
            series,
            resources,
            index: 0,
            completed: false,
            is_running: false,
            started: false,
            speed: Speed::default(),
            current_time,
            alerts: initial_alerts,
            pending: Vec::new(),
        })
    }

    pub fn from_bundle(bundle: SeriesBundle, resources: ResourceMetrics) -> Result<Self> {
        Self::new(bundle.readings, bundle.initial_alerts, resources)
    }

    /// Begin or resume playback once the required actuators are on.
    ///
    /// A completed run is rewound first. A refused start leaves all state as
    /// it was and queues an error notification naming the missing actuator.
    pub fn start(&mut self, gate: &ActuatorGate) -> Result<StartOutcome> {
        if self.is_running {
            return Ok(StartOutcome::AlreadyRunning);
        }
        if let Err(missing) = gate.check_start() {
            info!(actuator = missing.as_ref(), "start refused");
            self.pending
                .push(Notification::error(missing.start_requirement()));
            return Err(EngineError::Precondition(missing));
        }

        let outcome = if self.completed {
            self.restart();
            StartOutcome::Restarted
        } else if self.started {
            StartOutcome::Resumed
        } else {
            StartOutcome::Started
        };
        self.is_running = true;
        self.started = true;
        self.pending.push(Notification::success(STARTED_NOTICE));
        info!(index = self.index, speed = %self.speed, ?outcome, "playback running");
        Ok(outcome)
    }

    /// Stop advancing. Returns `false` when playback was not running.
    pub fn pause(&mut self) -> bool {
        if !self.is_running {
            return false;
        }
        self.is_running = false;
        info!(index = self.index, "playback paused");
        true
    }

    /// Rewind to the first reading and clear the alert log. The running flag
    /// is left as it is.
    pub fn restart(&mut self) {
        self.index = 0;
        self.completed = false;
        self.alerts.clear();
        self.current_time = self.series[0].timestamp;
        self.started = self.is_running;
        debug!(running = self.is_running, "playback rewound");
    }

    pub fn set_speed(&mut self, speed: Speed) {
        if self.speed != speed {
            debug!(from = %self.speed, to = %speed, "speed changed");
        }
        self.speed = speed;
    }

    /// Consume one reading.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running || self.completed {
            return TickOutcome::Ignored;
        }

        let last = self.series.len() - 1;
        if self.index >= last {
            let final_reading = &self.series[last];
            let final_growth = final_reading.growth_level;
            self.is_running = false;
            self.completed = true;
            self.alerts.insert(
                0,
                Alert::new(
                    AlertKind::SimulationComplete,
                    format!("Simulation completed with plant growth at {final_growth}%"),
                    final_reading.timestamp,
                ),
            );
            self.pending.push(Notification::success(COMPLETED_NOTICE));
            info!(index = self.index, final_growth, status = %self.status(), "playback completed");
            return TickOutcome::Completed { final_growth };
        }

        self.index += 1;
        let reading = &self.series[self.index];
        self.current_time = reading.timestamp;
        let evaluation = evaluate(reading, &self.alerts);
        if evaluation.alerts.len() != self.alerts.len() {
            for kind in &evaluation.raised {
                debug!(index = self.index, kind = kind.as_ref(), "alert raised");
            }
            self.alerts = evaluation.alerts;
        }
        self.pending.extend(evaluation.notifications);
        TickOutcome::Advanced {
            index: self.index,
            raised: evaluation.raised,
        }
    }

    /// Remove the alert at `index` (newest first). Out of range is a no-op.
    pub fn dismiss_alert(&mut self, index: usize) -> Result<Alert> {
        if index >= self.alerts.len() {
            return Err(EngineError::AlertOutOfRange {
                index,
                len: self.alerts.len(),
            });
        }
        Ok(self.alerts.remove(index))
    }

    pub fn status(&self) -> PlaybackStatus {
        if self.completed {
            PlaybackStatus::Completed
        } else if self.is_running {
            PlaybackStatus::Running
        } else if self.started {
            PlaybackStatus::Paused
        } else {
            PlaybackStatus::Idle
        }
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            status: self.status(),
            is_running: self.is_running,
            completed: self.completed,
            speed: self.speed,
            current_index: self.index,
            current_time: self.current_time,
            reading: self.current_reading().clone(),
            alerts: self.alerts.clone(),
            series_len: self.series.len(),
            progress_percent: self.progress_percent(),
            resources: self.resources,
            summary: SeriesSummary::new(self.averages, &self.alerts),
        }
    }

    pub fn progress_percent(&self) -> f64 {
        let len = self.series.len();
        if len <= 1 {
            return 100.0;
        }
        self.index as f64 / (len - 1) as f64 * 100.0
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn current_time(&self) -> DateTime<Utc> {
        self.current_time
    }

    pub fn current_reading(&self) -> &Reading {
        &self.series[self.index]
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn series(&self) -> &Arc<[Reading]> {
        &self.series
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuators::{Actuator, ActuatorStates};
    use crate::alerts::AlertLevel;
    use crate::generator::SeriesGenerator;
    use crate::notify::NotificationLevel;

    fn ready_gate() -> ActuatorGate {
        ActuatorGate::with_states(ActuatorStates {
            water_pump: true,
            grow_lights: true,
            ventilation: true,
            nutrient_dispenser: false,
        })
    }

    fn series_with_water(levels: &[f64]) -> Vec<Reading> {
        let mut series = SeriesGenerator::new(3).samples(levels.len()).generate();
        for (reading, level) in series.iter_mut().zip(levels) {
            reading.water_level = *level;
            reading.temperature = 22.0;
            reading.soil_moisture = 70.0;
            reading.growth_level = 10.0;
        }
        series
    }

    fn engine(levels: &[f64]) -> PlaybackEngine {
        PlaybackEngine::new(series_with_water(levels), Vec::new(), ResourceMetrics::default())
            .unwrap()
    }

    #[test]
    fn speeds_map_to_periods() {
        let periods: Vec<_> = Speed::ALL.iter().map(|s| s.tick_period().as_millis()).collect();
        assert_eq!(periods, [1000, 200, 100, 20]);
        assert_eq!(Speed::default(), Speed::X5);
        assert_eq!(Speed::try_from(3_u32), Err(EngineError::UnsupportedSpeed(3)));
        assert_eq!(Speed::try_from(50_u32), Ok(Speed::X50));
    }

    #[test]
    fn empty_series_rejected() {
        let err = PlaybackEngine::new(Vec::<Reading>::new(), Vec::new(), ResourceMetrics::default())
            .unwrap_err();
        assert_eq!(err, EngineError::EmptySeries);
    }

    #[test]
    fn start_requires_all_three_actuators() {
        let mut engine = engine(&[90.0, 90.0]);
        let mut gate = ActuatorGate::new();
        gate.toggle(Actuator::WaterPump);
        gate.toggle(Actuator::GrowLights);
        assert_eq!(
            engine.start(&gate),
            Err(EngineError::Precondition(Actuator::Ventilation))
        );
        assert!(!engine.is_running());
        assert_eq!(engine.status(), PlaybackStatus::Idle);
        let notes = engine.drain_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Error);
        assert_eq!(
            notes[0].message,
            "Ventilation system must be turned on before starting simulation"
        );

        gate.toggle(Actuator::Ventilation);
        assert_eq!(engine.start(&gate), Ok(StartOutcome::Started));
        assert_eq!(engine.status(), PlaybackStatus::Running);
        assert_eq!(engine.drain_notifications()[0].message, STARTED_NOTICE);
    }

    #[test]
    fn start_while_running_is_a_no_op() {
        let mut engine = engine(&[90.0, 90.0]);
        engine.start(&ready_gate()).unwrap();
        engine.drain_notifications();
        assert_eq!(engine.start(&ActuatorGate::new()), Ok(StartOutcome::AlreadyRunning));
        assert!(engine.drain_notifications().is_empty());
    }

    #[test]
    fn tick_is_ignored_unless_running() {
        let mut engine = engine(&[90.0, 90.0]);
        assert_eq!(engine.tick(), TickOutcome::Ignored);
        assert_eq!(engine.current_index(), 0);
    }

    #[test]
    fn pause_and_resume() {
        let mut engine = engine(&[90.0, 90.0, 90.0]);
        assert!(!engine.pause());
        engine.start(&ready_gate()).unwrap();
        engine.tick();
        assert!(engine.pause());
        assert_eq!(engine.status(), PlaybackStatus::Paused);
        assert_eq!(engine.tick(), TickOutcome::Ignored);
        assert_eq!(engine.start(&ready_gate()), Ok(StartOutcome::Resumed));
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn water_drain_scenario() {
        let mut engine = engine(&[90.0, 35.0, 10.0]);
        engine.start(&ready_gate()).unwrap();

        assert_eq!(
            engine.tick(),
            TickOutcome::Advanced { index: 1, raised: vec![AlertKind::WaterLow] }
        );
        assert_eq!(engine.alerts()[0].message, "Water level low. Consider refilling soon.");
        assert_eq!(engine.alerts()[0].level, AlertLevel::Warning);

        assert_eq!(
            engine.tick(),
            TickOutcome::Advanced { index: 2, raised: vec![AlertKind::WaterCritical] }
        );
        assert_eq!(engine.alerts()[0].level, AlertLevel::Error);
        assert_eq!(engine.alerts()[0].message, "Water level critical. Refill required!");
        assert!(!engine.is_completed());

        assert_eq!(engine.tick(), TickOutcome::Completed { final_growth: 10.0 });
        assert!(engine.is_completed());
        assert!(!engine.is_running());
        let terminal = &engine.alerts()[0];
        assert_eq!(terminal.kind, Some(AlertKind::SimulationComplete));
        assert_eq!(terminal.level, AlertLevel::Info);
        assert_eq!(terminal.message, "Simulation completed with plant growth at 10%");
        assert_eq!(terminal.timestamp, engine.series()[2].timestamp);
        assert_eq!(engine.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn full_day_completes_after_len_ticks() {
        let series = SeriesGenerator::new(42).generate();
        let len = series.len();
        let mut engine = PlaybackEngine::new(series, Vec::new(), ResourceMetrics::default()).unwrap();
        engine.start(&ready_gate()).unwrap();
        for _ in 0..len - 1 {
            assert!(matches!(engine.tick(), TickOutcome::Advanced { .. }));
        }
        assert_eq!(engine.snapshot().progress_percent, 100.0);
        assert!(matches!(engine.tick(), TickOutcome::Completed { .. }));
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.status, PlaybackStatus::Completed);
        assert_eq!(snapshot.current_index, len - 1);
        assert_eq!(snapshot.alerts[0].kind, Some(AlertKind::SimulationComplete));
    }

    #[test]
    fn completed_start_restarts() {
        let mut engine = engine(&[90.0, 10.0]);
        engine.start(&ready_gate()).unwrap();
        engine.tick();
        engine.tick();
        assert!(engine.is_completed());
        assert_eq!(engine.start(&ready_gate()), Ok(StartOutcome::Restarted));
        assert_eq!(engine.current_index(), 0);
        assert!(engine.alerts().is_empty());
        assert!(engine.is_running());
    }

    #[test]
    fn restart_clears_progress_but_keeps_running_flag() {
        let mut engine = engine(&[90.0, 35.0, 90.0]);
        engine.start(&ready_gate()).unwrap();
        engine.tick();
        engine.restart();
        assert_eq!(engine.current_index(), 0);
        assert!(engine.alerts().is_empty());
        assert!(!engine.is_completed());
        assert!(engine.is_running());
        assert_eq!(engine.current_time(), engine.series()[0].timestamp);

        engine.pause();
        engine.restart();
        assert_eq!(engine.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn dismiss_removes_one_and_keeps_order() {
        let generator = SeriesGenerator::new(1).samples(2);
        let seeded = generator.initial_alerts();
        let mut engine =
            PlaybackEngine::new(generator.generate(), seeded.clone(), ResourceMetrics::default())
                .unwrap();
        assert_eq!(engine.dismiss_alert(1).unwrap(), seeded[1]);
        assert_eq!(engine.alerts(), &[seeded[0].clone(), seeded[2].clone()]);

        assert_eq!(
            engine.dismiss_alert(2),
            Err(EngineError::AlertOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(engine.alerts().len(), 2);
    }

    #[test]
    fn repeated_condition_raises_once_until_dismissed() {
        let mut engine = engine(&[90.0, 35.0, 35.0, 35.0, 35.0]);
        engine.start(&ready_gate()).unwrap();
        engine.tick();
        engine.tick();
        assert_eq!(engine.alerts().len(), 1);
        engine.dismiss_alert(0).unwrap();
        engine.tick();
        assert_eq!(engine.alerts().len(), 1);
        assert_eq!(engine.alerts()[0].kind, Some(AlertKind::WaterLow));
    }

    #[test]
    fn single_reading_series_reports_full_progress() {
        let engine = engine(&[90.0]);
        assert_eq!(engine.progress_percent(), 100.0);
    }

    #[test]
    fn speed_change_keeps_position() {
        let mut engine = engine(&[90.0, 90.0, 90.0]);
        engine.start(&ready_gate()).unwrap();
        engine.tick();
        engine.set_speed(Speed::X50);
        assert_eq!(engine.speed(), Speed::X50);
        assert_eq!(engine.current_index(), 1);
        assert!(engine.is_running());
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let snapshot = engine(&[90.0, 90.0]).snapshot();
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["speed"], 5);
        assert_eq!(value["status"], "idle");
        assert!(value.get("series").is_none());
        assert_eq!(value["seriesLen"], 2);
    }
}
