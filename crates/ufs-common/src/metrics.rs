//! ---
//! ufs_section: "01-core-functionality"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Shared primitives and utilities for the dashboard runtime."
//! ufs_version: "v0.0.0-prealpha"
//! ufs_owner: "tbd"
//! ---
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Default)]
pub struct JitterHistogram {
    samples: Mutex<Vec<f64>>,
}

impl JitterHistogram {
    pub fn record(&self, jitter: Duration) {
        let nanos = jitter.as_secs_f64() * 1_000_000_000.0;
        self.samples.lock().push(nanos);
    }

    pub fn summary(&self) -> Option<JitterSummary> {
        let samples = self.samples.lock();
        let slice = samples.as_slice();
        if slice.is_empty() {
            return None;
        }
        let count = slice.len() as f64;
        let mean = slice.iter().sum::<f64>() / count;
        let variance = if slice.len() > 1 {
            let sum_sq = slice
                .iter()
                .map(|value| {
                    let delta = value - mean;
                    delta * delta
                })
                .sum::<f64>();
            sum_sq / (count - 1.0)
        } else {
            0.0
        };
        let max = slice.iter().copied().fold(f64::MIN, f64::max);
        let min = slice.iter().copied().fold(f64::MAX, f64::min);
        Some(JitterSummary {
            mean_ns: mean,
            std_dev_ns: variance.sqrt(),
            max_ns: max,
            min_ns: min,
            samples: slice.len() as u64,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JitterSummary {
    pub mean_ns: f64,
    pub std_dev_ns: f64,
    pub max_ns: f64,
    pub min_ns: f64,
    pub samples: u64,
}

impl JitterSummary {
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        let json = serde_json::to_vec_pretty(self).map_err(std::io::Error::other)?;
        file.write_all(&json)
    }
}

/// Records how late each playback tick fired relative to its schedule.
///
/// The period changes with the playback speed, so callers hand in the
/// scheduled and observed instants rather than a fixed target interval.
#[derive(Debug, Default)]
pub struct TickTimingReporter {
    histogram: JitterHistogram,
}

impl TickTimingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_lateness(&self, lateness: Duration) {
        self.histogram.record(lateness);
    }

    pub fn histogram(&self) -> &JitterHistogram {
        &self.histogram
    }
}
