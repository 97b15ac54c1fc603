//! ---
//! ufs_section: "08-reporting"
//! ufs_subsection: "tests"
//! ufs_type: "test"
//! ufs_scope: "code"
//! ufs_description: "Integration tests for report export."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use std::fs;

use chrono::Utc;
use tempfile::TempDir;
use ufs_report::{ReportError, ReportExporter, SimulationReport, REPORT_TITLE};
use ufs_sim::{ActuatorGate, ActuatorStates, PlaybackEngine, ResourceMetrics, SeriesGenerator};

fn played_report() -> SimulationReport {
    let series = SeriesGenerator::new(9).samples(6).generate();
    let mut engine = PlaybackEngine::new(series, Vec::new(), ResourceMetrics::default()).unwrap();
    let gate = ActuatorGate::with_states(ActuatorStates {
        water_pump: true,
        grow_lights: true,
        ventilation: true,
        nutrient_dispenser: true,
    });
    engine.start(&gate).unwrap();
    while engine.is_running() {
        engine.tick();
    }
    SimulationReport::from_snapshot(&engine.snapshot(), Utc::now())
}

#[test]
fn writes_report_into_new_directory() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("downloads");
    let report = played_report();

    let path = ReportExporter::new(&report)
        .export(&out, "farming-simulation-report.txt")
        .unwrap();

    assert_eq!(path, out.join("farming-simulation-report.txt"));
    let text = fs::read_to_string(path).unwrap();
    assert!(text.starts_with(REPORT_TITLE));
    assert!(text.contains("[INFO]"));
    assert!(text.contains("Simulation completed with plant growth at"));
}

#[test]
fn rejects_path_like_file_names() {
    let dir = TempDir::new().unwrap();
    let report = played_report();
    let err = ReportExporter::new(&report)
        .export(dir.path(), "../escape.txt")
        .unwrap_err();
    assert!(matches!(err, ReportError::InvalidFileName(_)));
}

#[test]
fn unwritable_target_is_reported() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("taken");
    fs::write(&blocker, "not a directory").unwrap();
    let report = played_report();
    let err = ReportExporter::new(&report)
        .export(&blocker, "farming-simulation-report.txt")
        .unwrap_err();
    assert!(matches!(err, ReportError::Write { .. } | ReportError::Io(_)));
}
