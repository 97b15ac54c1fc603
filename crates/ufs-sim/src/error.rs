//! ---
//! ufs_section: "11-simulation"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Error types for the playback engine."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use std::path::PathBuf;

use thiserror::Error;

use crate::actuators::Actuator;

/// Errors raised by engine operations. None of them alter engine state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("reading series is empty")]
    EmptySeries,
    #[error("{}", start_requirement(.0))]
    Precondition(Actuator),
    #[error("speed {0}x is not supported (expected 1, 5, 10 or 50)")]
    UnsupportedSpeed(u32),
    #[error("alert index {index} out of range for {len} alerts")]
    AlertOutOfRange { index: usize, len: usize },
}

fn start_requirement(actuator: &Actuator) -> String {
    actuator.start_requirement()
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Problems with a series file that parse cleanly but cannot be played.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("unsupported series format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("series file {0} contains no readings")]
    NoReadings(PathBuf),
}
