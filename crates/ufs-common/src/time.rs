//! ---
//! ufs_section: "01-core-functionality"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Shared primitives and utilities for the dashboard runtime."
//! ufs_version: "v0.0.0-prealpha"
//! ufs_owner: "tbd"
//! ---
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Wall-clock tick period for a playback multiplier: `1000 ms / speed`.
///
/// A zero multiplier is treated as 1.
pub fn tick_period(speed: u32) -> Duration {
    Duration::from_millis(1000 / u64::from(speed.max(1)))
}

/// Convert a duration into microseconds, saturating at `u64::MAX`.
pub fn duration_to_micros(duration: Duration) -> u64 {
    duration
        .as_secs()
        .saturating_mul(1_000_000)
        .saturating_add(u64::from(duration.subsec_micros()))
}

/// Timestamp layout shared by the report and console output.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a simulation instant for humans.
pub fn display_timestamp(at: &DateTime<Utc>) -> String {
    at.format(DISPLAY_FORMAT).to_string()
}
