//! ---
//! ufs_section: "05-host-interfaces"
//! ufs_subsection: "binary"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Playback command for the dashboard host."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;
use ufs_common::config::{AppConfig, SUPPORTED_SPEEDS};
use ufs_core::{launch, SessionError, SessionHandle};
use ufs_persistence::{Landing, ProfileStore};
use ufs_sim::{Actuator, EngineSnapshot};

use crate::onboard::ONBOARDING_HINT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ActuatorArg {
    WaterPump,
    GrowLights,
    Ventilation,
    NutrientDispenser,
}

impl From<ActuatorArg> for Actuator {
    fn from(arg: ActuatorArg) -> Self {
        match arg {
            ActuatorArg::WaterPump => Actuator::WaterPump,
            ActuatorArg::GrowLights => Actuator::GrowLights,
            ActuatorArg::Ventilation => Actuator::Ventilation,
            ActuatorArg::NutrientDispenser => Actuator::NutrientDispenser,
        }
    }
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(
        long = "actuator",
        value_enum,
        value_name = "NAME",
        help = "Switch an actuator on before starting (repeatable)"
    )]
    actuators: Vec<ActuatorArg>,
    #[arg(long, help = "Switch on the water pump, grow lights and ventilation")]
    ready: bool,
    #[arg(long, value_parser = parse_speed, help = "Playback multiplier: 1, 5, 10 or 50")]
    speed: Option<u32>,
    #[arg(long, value_name = "DIR", help = "Directory for the downloaded report")]
    report_dir: Option<PathBuf>,
    #[arg(long, help = "Skip the report download")]
    no_report: bool,
    #[arg(long, value_name = "FILE", help = "Write tick lateness statistics as JSON")]
    timing_json: Option<PathBuf>,
}

fn parse_speed(raw: &str) -> Result<u32, String> {
    let speed: u32 = raw.parse().map_err(|_| format!("'{raw}' is not a number"))?;
    if SUPPORTED_SPEEDS.contains(&speed) {
        Ok(speed)
    } else {
        Err(format!("speed must be one of {SUPPORTED_SPEEDS:?}"))
    }
}

impl RunArgs {
    fn requested_actuators(&self) -> Vec<Actuator> {
        let mut requested: Vec<Actuator> = Vec::new();
        if self.ready {
            requested.extend(Actuator::REQUIRED_FOR_START);
        }
        for actuator in self.actuators.iter().copied().map(Actuator::from) {
            if !requested.contains(&actuator) {
                requested.push(actuator);
            }
        }
        requested
    }
}

pub async fn run(args: RunArgs, mut config: AppConfig, profiles: &ProfileStore) -> Result<()> {
    let profile = match profiles.landing() {
        Landing::Dashboard(profile) => profile,
        Landing::Onboarding { reason } => {
            bail!("no usable farmer profile ({reason}). {ONBOARDING_HINT}")
        }
    };
    if let Some(speed) = args.speed {
        config.simulation.speed = speed;
    }
    if let Some(dir) = &args.report_dir {
        config.report.directory = dir.clone();
    }

    let session = launch(&config)?;
    println!(
        "Welcome back, {}! Simulating a day at {} ({} readings at {}x).",
        profile.name,
        profile.location,
        session.snapshot().series_len,
        config.simulation.speed
    );
    let printer = spawn_notification_printer(&session);

    let outcome = play(&session, &args).await;
    let report = match (&outcome, args.no_report) {
        (Ok(_), false) => Some(session.download_report().await),
        _ => None,
    };

    let summary = session.shutdown().await;
    drop(session);
    if let Err(err) = printer.await {
        warn!(error = %err, "notification printer failed");
    }

    let snapshot = outcome?;
    print_summary(&snapshot);
    match report {
        Some(Ok(path)) => println!("Report written to {}", path.display()),
        Some(Err(err)) => return Err(err).context("report download failed"),
        None => {}
    }

    let summary = summary.context("session did not shut down cleanly")?;
    match (&args.timing_json, &summary.lateness) {
        (Some(path), Some(lateness)) => lateness
            .write_json(path)
            .with_context(|| format!("unable to write timing statistics to {}", path.display()))?,
        (Some(_), None) => warn!("no ticks fired; timing statistics skipped"),
        _ => {}
    }
    Ok(())
}

async fn play(session: &SessionHandle, args: &RunArgs) -> Result<EngineSnapshot> {
    for actuator in args.requested_actuators() {
        session.toggle_actuator(actuator).await?;
    }
    match session.start().await {
        Ok(_) => {}
        Err(SessionError::Engine(err)) => bail!("{err}"),
        Err(err) => return Err(err.into()),
    }

    tokio::select! {
        done = session.wait_until_completed() => Ok(done?),
        interrupted = signal::ctrl_c() => {
            interrupted.context("unable to listen for interrupt")?;
            session.pause().await?;
            println!("Interrupted; playback paused.");
            Ok(session.snapshot())
        }
    }
}

fn spawn_notification_printer(session: &SessionHandle) -> tokio::task::JoinHandle<()> {
    let mut notifications = session.notifications();
    tokio::spawn(async move {
        loop {
            match notifications.recv().await {
                Ok(note) => println!("{note}"),
                Err(RecvError::Lagged(missed)) => warn!(missed, "notifications dropped"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn print_summary(snapshot: &EngineSnapshot) {
    let reading = &snapshot.reading;
    println!(
        "Status: {} at {:.0}% ({})",
        snapshot.status,
        snapshot.progress_percent,
        ufs_common::time::display_timestamp(&snapshot.current_time)
    );
    println!(
        "Growth {}% | Water {}% | Temperature {}°C | Soil {}%",
        reading.growth_level, reading.water_level, reading.temperature, reading.soil_moisture
    );
    let summary = &snapshot.summary;
    if summary.all_good() {
        println!("Alerts: all good");
    } else {
        println!(
            "Alerts: {} warnings, {} errors",
            summary.warnings, summary.errors
        );
    }
}
