//! ---
//! ufs_section: "11-simulation"
//! ufs_subsection: "01-bootstrap"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Playback engine module exports and shared types."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
//! Playback of a fixed 24-hour urban-farm reading series.
//!
//! The [`PlaybackEngine`] owns simulation time and the alert log, the
//! [`ActuatorGate`] owns the manually toggled actuators, and
//! [`alerts::evaluate`] derives alerts from each reading. Everything here is
//! synchronous; scheduling lives in `ufs-rt` and `ufs-core`.

pub mod actuators;
pub mod alerts;
pub mod engine;
pub mod error;
pub mod generator;
pub mod notify;
pub mod reading;
pub mod replay;
pub mod resources;
pub mod source;

pub use actuators::{Actuator, ActuatorGate, ActuatorStates};
pub use alerts::{evaluate, Alert, AlertKind, AlertLevel, Evaluation};
pub use engine::{EngineSnapshot, PlaybackEngine, PlaybackStatus, Speed, StartOutcome, TickOutcome};
pub use error::{EngineError, Result, SeriesError};
pub use generator::SeriesGenerator;
pub use notify::{Notification, NotificationLevel, Priority};
pub use reading::{ActuatorHints, Consumption, Reading};
pub use replay::SeriesFile;
pub use resources::{EnergyEfficiency, ResourceMetrics, SeriesAverages, SeriesSummary, WaterManagement};
pub use source::{DataSource, SeriesBundle};
