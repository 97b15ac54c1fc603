//! ---
//! ufs_section: "01-core-functionality"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Session runtime and lifecycle management."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use std::path::Path;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use tempfile::{tempdir, TempDir};
use ufs_common::config::AppConfig;
use ufs_core::{launch, SessionError};
use ufs_sim::{
    Actuator, ActuatorHints, AlertKind, Consumption, EngineError, NotificationLevel,
    PlaybackStatus, Reading, SeriesFile, Speed, StartOutcome,
};

fn reading(step: i64, water: f64) -> Reading {
    Reading {
        timestamp: Utc.with_ymd_and_hms(2025, 4, 6, 0, 0, 0).unwrap()
            + ChronoDuration::minutes(5 * step),
        temperature: 22.0,
        humidity: 60.0,
        soil_moisture: 70.0,
        light_intensity: 9000.0,
        co2_level: 450.0,
        water_level: water,
        growth_level: 10.0 + step as f64,
        actuators: ActuatorHints::default(),
        consumption: Consumption {
            energy: 1.5 * step as f64,
            water: 2.0 * step as f64,
        },
    }
}

fn config_for(dir: &Path, series: Option<&Path>) -> AppConfig {
    let mut config = AppConfig::default();
    config.simulation.series_file = series.map(Path::to_path_buf);
    config.simulation.samples = 12;
    config.report.directory = dir.join("reports");
    config
}

fn replay_config(levels: &[f64]) -> (TempDir, AppConfig) {
    let dir = tempdir().unwrap();
    let readings = levels
        .iter()
        .enumerate()
        .map(|(step, water)| reading(step as i64, *water))
        .collect();
    let path = dir.path().join("series.json");
    SeriesFile::new(readings, Vec::new()).save(&path).unwrap();
    let config = config_for(dir.path(), Some(&path));
    (dir, config)
}

async fn switch_on_required(session: &ufs_core::SessionHandle) {
    for actuator in Actuator::REQUIRED_FOR_START {
        assert!(session.toggle_actuator(actuator).await.unwrap());
    }
}

#[tokio::test(start_paused = true)]
async fn water_levels_raise_low_then_critical_then_complete() {
    let (_dir, config) = replay_config(&[90.0, 35.0, 10.0]);
    let session = launch(&config).unwrap();
    switch_on_required(&session).await;
    assert_eq!(session.start().await.unwrap(), StartOutcome::Started);

    let done = session.wait_until_completed().await.unwrap();
    let kinds: Vec<_> = done.alerts.iter().filter_map(|alert| alert.kind).collect();
    assert_eq!(
        kinds,
        vec![
            AlertKind::SimulationComplete,
            AlertKind::WaterCritical,
            AlertKind::WaterLow
        ]
    );
    assert_eq!(
        done.alerts[0].message,
        "Simulation completed with plant growth at 12%"
    );
    assert_eq!(done.current_index, 2);
    assert_eq!(done.progress_percent, 100.0);

    let summary = session.shutdown().await.unwrap();
    assert_eq!(summary.ticks, 3);
    assert_eq!(summary.final_status, PlaybackStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn generated_session_carries_seeded_alerts() {
    let dir = tempdir().unwrap();
    let config = config_for(dir.path(), None);
    let session = launch(&config).unwrap();
    let snapshot = session.snapshot();
    assert_eq!(snapshot.series_len, 12);
    assert_eq!(snapshot.alerts.len(), 3);
    assert_eq!(snapshot.status, PlaybackStatus::Idle);
    session.shutdown().await.unwrap();

    let mut quiet = config_for(dir.path(), None);
    quiet.simulation.seed_initial_alerts = false;
    let session = launch(&quiet).unwrap();
    assert!(session.snapshot().alerts.is_empty());
    session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn start_names_first_missing_actuator() {
    let (_dir, config) = replay_config(&[90.0, 80.0, 70.0]);
    let session = launch(&config).unwrap();
    let mut notes = session.notifications();
    session.toggle_actuator(Actuator::WaterPump).await.unwrap();

    let err = session.start().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Engine(EngineError::Precondition(Actuator::GrowLights))
    ));
    assert_eq!(
        err.to_string(),
        "Grow lights must be turned on before starting simulation"
    );

    let mut levels = Vec::new();
    while let Ok(note) = notes.try_recv() {
        levels.push(note.level);
    }
    assert_eq!(levels.last(), Some(&NotificationLevel::Error));
    assert_eq!(session.snapshot().status, PlaybackStatus::Idle);
    session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn start_after_completion_replays_from_the_top() {
    let (_dir, config) = replay_config(&[90.0, 80.0]);
    let session = launch(&config).unwrap();
    switch_on_required(&session).await;
    session.start().await.unwrap();
    session.wait_until_completed().await.unwrap();

    assert_eq!(session.start().await.unwrap(), StartOutcome::Restarted);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.current_index, 0);
    assert!(snapshot.alerts.is_empty());
    assert!(snapshot.is_running);
    session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn speed_change_mid_playback_shortens_ticks() {
    let levels = vec![90.0; 40];
    let (_dir, config) = replay_config(&levels);
    let session = launch(&config).unwrap();
    switch_on_required(&session).await;
    session.start().await.unwrap();

    let mut snapshots = session.subscribe();
    snapshots.wait_for(|s| s.current_index == 2).await.unwrap();
    assert_eq!(session.set_speed(50).await.unwrap(), Speed::X50);

    let switched = tokio::time::Instant::now();
    snapshots.wait_for(|s| s.current_index == 12).await.unwrap();
    assert_eq!(switched.elapsed(), Duration::from_millis(200));
    session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn dismissing_alerts_by_position() {
    let (_dir, config) = replay_config(&[90.0, 35.0, 10.0]);
    let session = launch(&config).unwrap();
    switch_on_required(&session).await;
    session.start().await.unwrap();
    session.wait_until_completed().await.unwrap();

    let removed = session.dismiss_alert(1).await.unwrap();
    assert_eq!(removed.kind, Some(AlertKind::WaterCritical));
    assert_eq!(session.snapshot().alerts.len(), 2);
    assert!(matches!(
        session.dismiss_alert(9).await,
        Err(SessionError::Engine(EngineError::AlertOutOfRange { index: 9, len: 2 }))
    ));
    session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn report_reflects_final_reading() {
    let (dir, config) = replay_config(&[90.0, 35.0, 10.0]);
    let session = launch(&config).unwrap();
    switch_on_required(&session).await;
    session.start().await.unwrap();
    session.wait_until_completed().await.unwrap();

    let path = session.download_report().await.unwrap();
    assert_eq!(path, dir.path().join("reports/farming-simulation-report.txt"));
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("Plant Growth: 12.0%"));
    assert!(text.contains("Final Water Level: 10.0%"));
    assert!(text.contains("Total Energy Consumption: 3.00 kWh"));
    assert!(text.contains("[ERROR] 2025-04-06 00:10:00: Water level critical. Refill required!"));
    session.shutdown().await.unwrap();
}
