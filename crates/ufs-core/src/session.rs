//! ---
//! ufs_section: "01-core-functionality"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Session runtime and lifecycle management."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
//! One dashboard session: a single task owning the playback engine and the
//! actuator gate.
//!
//! User commands and timer fires share one bounded queue, so every envelope
//! runs to completion before the next. After each envelope the task
//! re-derives the tick period from the engine, publishes a fresh snapshot and
//! forwards pending notifications.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use ufs_common::config::AppConfig;
use ufs_common::metrics::{JitterSummary, TickTimingReporter};
use ufs_logging::{log_system_event, ufs_debug, ufs_info, LogContext, SystemEventOutcome};
use ufs_report::{ReportError, ReportExporter, SimulationReport};
use ufs_rt::{TickScheduler, TimerFired};
use ufs_sim::{
    Actuator, ActuatorGate, ActuatorStates, Alert, EngineError, EngineSnapshot, Notification,
    PlaybackEngine, PlaybackStatus, ResourceMetrics, SeriesBundle, Speed, StartOutcome,
    TickOutcome,
};
use uuid::Uuid;

const NOTIFICATION_CAPACITY: usize = 64;
const REPORT_DOWNLOADED: &str = "Report downloaded successfully!";
const REPORT_FAILED: &str = "Failed to download report";

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session runtime has stopped")]
    Closed,
    #[error("session did not stop within {0:?}")]
    ShutdownTimeout(Duration),
    #[error("session task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Settings for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub speed: Speed,
    pub queue_depth: usize,
    pub shutdown_grace: Duration,
    pub report_dir: PathBuf,
    pub report_file_name: String,
    pub resources: ResourceMetrics,
    pub actuators: ActuatorStates,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let app = AppConfig::default();
        Self {
            speed: Speed::default(),
            queue_depth: app.simulation.queue_depth,
            shutdown_grace: app.simulation.shutdown_grace,
            report_dir: app.report.directory,
            report_file_name: app.report.file_name,
            resources: ResourceMetrics::default(),
            actuators: ActuatorStates::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_app_config(config: &AppConfig) -> std::result::Result<Self, EngineError> {
        let simulation = &config.simulation;
        Ok(Self {
            speed: Speed::try_from(simulation.speed)?,
            queue_depth: simulation.queue_depth.max(1),
            shutdown_grace: simulation.shutdown_grace,
            report_dir: config.report.directory.clone(),
            report_file_name: config.report.file_name.clone(),
            resources: ResourceMetrics::from_config(&simulation.water, &simulation.energy),
            actuators: ActuatorStates::default(),
        })
    }
}

/// Requests accepted by the session task. Each carries its reply channel.
#[derive(Debug)]
pub enum SessionCommand {
    Start {
        reply: oneshot::Sender<std::result::Result<StartOutcome, EngineError>>,
    },
    Pause {
        reply: oneshot::Sender<bool>,
    },
    TogglePlay {
        reply: oneshot::Sender<std::result::Result<PlaybackStatus, EngineError>>,
    },
    SetSpeed {
        speed: Speed,
        reply: oneshot::Sender<Speed>,
    },
    Restart {
        reply: oneshot::Sender<()>,
    },
    DismissAlert {
        index: usize,
        reply: oneshot::Sender<std::result::Result<Alert, EngineError>>,
    },
    ToggleActuator {
        actuator: Actuator,
        reply: oneshot::Sender<bool>,
    },
    Actuators {
        reply: oneshot::Sender<ActuatorStates>,
    },
    DownloadReport {
        reply: oneshot::Sender<std::result::Result<PathBuf, ReportError>>,
    },
    Shutdown,
}

#[derive(Debug)]
enum Envelope {
    Command(SessionCommand),
    Tick(TimerFired),
}

impl From<TimerFired> for Envelope {
    fn from(fired: TimerFired) -> Self {
        Envelope::Tick(fired)
    }
}

/// Totals reported when a session stops.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub session_id: String,
    pub ticks: u64,
    pub stale_ticks: u64,
    pub final_status: PlaybackStatus,
    pub lateness: Option<JitterSummary>,
}

/// Entry point for spawning sessions.
#[derive(Debug)]
pub struct SessionRuntime;

impl SessionRuntime {
    /// Build the engine from `bundle` and spawn the session task on the
    /// current tokio runtime.
    pub fn spawn(bundle: SeriesBundle, config: SessionConfig) -> Result<SessionHandle> {
        let mut engine = PlaybackEngine::from_bundle(bundle, config.resources)?;
        engine.set_speed(config.speed);
        let gate = ActuatorGate::with_states(config.actuators);

        let session_id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(config.queue_depth.max(1));
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
        let (notify_tx, _) = broadcast::channel(NOTIFICATION_CAPACITY);

        let actor = SessionActor {
            id: session_id.clone(),
            engine,
            gate,
            scheduler: TickScheduler::new(tx.clone()),
            snapshots: snapshot_tx,
            notifications: notify_tx.clone(),
            report_dir: config.report_dir,
            report_file_name: config.report_file_name,
            timing: TickTimingReporter::new(),
            ticks: 0,
            stale_ticks: 0,
        };
        let task = tokio::spawn(actor.run(rx));

        ufs_info!(
            context = LogContext::new()
                .with_session(&session_id)
                .with_speed(config.speed.multiplier()),
            "session started"
        );

        Ok(SessionHandle {
            id: session_id.into(),
            tx,
            snapshots: snapshot_rx,
            notifications: notify_tx,
            shutdown_grace: config.shutdown_grace,
            task: Arc::new(Mutex::new(Some(task))),
        })
    }
}

/// Cloneable handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: Arc<str>,
    tx: mpsc::Sender<Envelope>,
    snapshots: watch::Receiver<EngineSnapshot>,
    notifications: broadcast::Sender<Notification>,
    shutdown_grace: Duration,
    task: Arc<Mutex<Option<JoinHandle<SessionSummary>>>>,
}

impl SessionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Start or resume playback. Refusals surface as
    /// [`EngineError::Precondition`] and leave the session unchanged.
    pub async fn start(&self) -> Result<StartOutcome> {
        Ok(self.request(|reply| SessionCommand::Start { reply }).await??)
    }

    pub async fn pause(&self) -> Result<bool> {
        self.request(|reply| SessionCommand::Pause { reply }).await
    }

    /// Play/pause button: pause when running, start otherwise.
    pub async fn toggle_play(&self) -> Result<PlaybackStatus> {
        Ok(self.request(|reply| SessionCommand::TogglePlay { reply }).await??)
    }

    /// Change the playback multiplier. Values outside 1, 5, 10 and 50 are
    /// refused before reaching the session.
    pub async fn set_speed(&self, multiplier: u32) -> Result<Speed> {
        let speed = Speed::try_from(multiplier)?;
        self.request(|reply| SessionCommand::SetSpeed { speed, reply }).await
    }

    pub async fn restart(&self) -> Result<()> {
        self.request(|reply| SessionCommand::Restart { reply }).await
    }

    pub async fn dismiss_alert(&self, index: usize) -> Result<Alert> {
        Ok(self
            .request(|reply| SessionCommand::DismissAlert { index, reply })
            .await??)
    }

    /// Flip an actuator and return its new state.
    pub async fn toggle_actuator(&self, actuator: Actuator) -> Result<bool> {
        self.request(|reply| SessionCommand::ToggleActuator { actuator, reply })
            .await
    }

    pub async fn actuators(&self) -> Result<ActuatorStates> {
        self.request(|reply| SessionCommand::Actuators { reply }).await
    }

    /// Write the text report and return its path.
    pub async fn download_report(&self) -> Result<PathBuf> {
        Ok(self
            .request(|reply| SessionCommand::DownloadReport { reply })
            .await??)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> EngineSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<EngineSnapshot> {
        self.snapshots.clone()
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// Resolve once playback has reached the end of the series.
    pub async fn wait_until_completed(&self) -> Result<EngineSnapshot> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|snapshot| snapshot.completed)
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(snapshot.clone())
    }

    /// Stop the session task and return its totals. Only the first caller
    /// across all clones receives the summary.
    pub async fn shutdown(&self) -> Result<SessionSummary> {
        let _ = self
            .tx
            .send(Envelope::Command(SessionCommand::Shutdown))
            .await;
        let Some(mut task) = self.task.lock().take() else {
            return Err(SessionError::Closed);
        };
        match tokio::time::timeout(self.shutdown_grace, &mut task).await {
            Ok(joined) => Ok(joined?),
            Err(_) => {
                task.abort();
                Err(SessionError::ShutdownTimeout(self.shutdown_grace))
            }
        }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope::Command(build(reply)))
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }
}

struct SessionActor {
    id: String,
    engine: PlaybackEngine,
    gate: ActuatorGate,
    scheduler: TickScheduler<Envelope>,
    snapshots: watch::Sender<EngineSnapshot>,
    notifications: broadcast::Sender<Notification>,
    report_dir: PathBuf,
    report_file_name: String,
    timing: TickTimingReporter,
    ticks: u64,
    stale_ticks: u64,
}

impl SessionActor {
    async fn run(mut self, mut rx: mpsc::Receiver<Envelope>) -> SessionSummary {
        loop {
            let envelope = tokio::select! {
                envelope = rx.recv() => envelope,
                // Every handle holds a snapshot receiver.
                _ = self.snapshots.closed() => None,
            };
            match envelope {
                Some(Envelope::Tick(fired)) => {
                    self.on_tick(fired);
                    self.sync();
                }
                Some(Envelope::Command(SessionCommand::Shutdown)) | None => break,
                Some(Envelope::Command(command)) => self.on_command(command),
            }
        }
        self.scheduler.stop();
        self.finish()
    }

    fn on_tick(&mut self, fired: TimerFired) {
        if !self.scheduler.is_current(fired.generation) {
            self.stale_ticks += 1;
            debug!(session = %self.id, generation = fired.generation, "stale tick dropped");
            return;
        }
        self.timing.record_lateness(fired.lateness());
        self.ticks += 1;

        match self.engine.tick() {
            TickOutcome::Advanced { index, raised } => {
                for kind in raised {
                    ufs_info!(
                        context = self.context().with_tick(index as u64),
                        "alert raised: {}",
                        kind.as_ref()
                    );
                }
            }
            TickOutcome::Completed { final_growth } => {
                let status = self.engine.status().to_string();
                let ctx = self.context().with_status(&status);
                log_system_event(
                    Some(&ctx),
                    "playback.completed",
                    &format!("final growth {final_growth}%"),
                    SystemEventOutcome::Success,
                );
            }
            TickOutcome::Ignored => {}
        }
    }

    fn on_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Start { reply } => {
                let result = self.start();
                self.respond(reply, result);
            }
            SessionCommand::Pause { reply } => {
                let paused = self.engine.pause();
                self.respond(reply, paused);
            }
            SessionCommand::TogglePlay { reply } => {
                let result = if self.engine.is_running() {
                    self.engine.pause();
                    Ok(self.engine.status())
                } else {
                    self.start().map(|_| self.engine.status())
                };
                self.respond(reply, result);
            }
            SessionCommand::SetSpeed { speed, reply } => {
                self.engine.set_speed(speed);
                self.respond(reply, speed);
            }
            SessionCommand::Restart { reply } => {
                self.engine.restart();
                self.respond(reply, ());
            }
            SessionCommand::DismissAlert { index, reply } => {
                let result = self.engine.dismiss_alert(index);
                if let Err(err) = &result {
                    ufs_debug!(context = self.context(), "dismissal ignored: {err}");
                }
                self.respond(reply, result);
            }
            SessionCommand::ToggleActuator { actuator, reply } => {
                let on = self.gate.toggle(actuator);
                self.respond(reply, on);
            }
            SessionCommand::Actuators { reply } => {
                let states = self.gate.states();
                self.respond(reply, states);
            }
            SessionCommand::DownloadReport { reply } => {
                let result = self.download_report();
                self.respond(reply, result);
            }
            SessionCommand::Shutdown => {}
        }
    }

    fn start(&mut self) -> std::result::Result<StartOutcome, EngineError> {
        let result = self.engine.start(&self.gate);
        let (message, outcome) = match &result {
            Ok(outcome) => (format!("{outcome:?}"), SystemEventOutcome::Success),
            Err(err) => (err.to_string(), SystemEventOutcome::Rejected),
        };
        let status = self.engine.status().to_string();
        let ctx = self.context().with_status(&status);
        log_system_event(Some(&ctx), "playback.start", &message, outcome);
        result
    }

    fn download_report(&mut self) -> std::result::Result<PathBuf, ReportError> {
        let report = SimulationReport::from_snapshot(&self.engine.snapshot(), Utc::now());
        let result = ReportExporter::new(&report).export(&self.report_dir, &self.report_file_name);
        let (note, message, outcome) = match &result {
            Ok(path) => (
                Notification::success(REPORT_DOWNLOADED),
                path.display().to_string(),
                SystemEventOutcome::Success,
            ),
            Err(err) => (
                Notification::error(REPORT_FAILED),
                err.to_string(),
                SystemEventOutcome::Fault,
            ),
        };
        log_system_event(Some(&self.context()), "report.export", &message, outcome);
        self.broadcast(note);
        result
    }

    /// Publish state before answering so callers observe their own effect.
    fn respond<T>(&mut self, reply: oneshot::Sender<T>, value: T) {
        self.sync();
        let _ = reply.send(value);
    }

    fn sync(&mut self) {
        let period = self
            .engine
            .is_running()
            .then(|| self.engine.speed().tick_period());
        if self.scheduler.set_period(period) {
            ufs_debug!(
                context = self.context(),
                "tick period now {:?}",
                self.scheduler.period()
            );
        }
        self.snapshots.send_replace(self.engine.snapshot());
        let pending: Vec<_> = self
            .engine
            .drain_notifications()
            .into_iter()
            .chain(self.gate.drain_notifications())
            .collect();
        for note in pending {
            self.broadcast(note);
        }
    }

    fn broadcast(&self, note: Notification) {
        debug!(session = %self.id, level = %note.level, message = %note.message, "notification");
        // No subscribers is fine; notifications are transient.
        let _ = self.notifications.send(note);
    }

    fn context(&self) -> LogContext<'_> {
        LogContext::new()
            .with_session(&self.id)
            .with_tick(self.engine.current_index() as u64)
            .with_speed(self.engine.speed().multiplier())
    }

    fn finish(self) -> SessionSummary {
        let lateness = self.timing.histogram().summary();
        let summary = SessionSummary {
            session_id: self.id.clone(),
            ticks: self.ticks,
            stale_ticks: self.stale_ticks,
            final_status: self.engine.status(),
            lateness,
        };
        info!(
            session = %summary.session_id,
            ticks = summary.ticks,
            stale_ticks = summary.stale_ticks,
            status = %summary.final_status,
            mean_lateness_ns = summary.lateness.as_ref().map(|l| l.mean_ns),
            max_lateness_ns = summary.lateness.as_ref().map(|l| l.max_ns),
            "session stopped"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ufs_sim::{AlertKind, NotificationLevel, SeriesGenerator};

    fn bundle(samples: usize) -> SeriesBundle {
        SeriesBundle {
            readings: SeriesGenerator::new(4).samples(samples).generate().into(),
            initial_alerts: Vec::new(),
        }
    }

    fn ready_config(dir: &std::path::Path) -> SessionConfig {
        SessionConfig {
            report_dir: dir.to_path_buf(),
            actuators: ActuatorStates {
                water_pump: true,
                grow_lights: true,
                ventilation: true,
                nutrient_dispenser: false,
            },
            ..SessionConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn refused_start_keeps_session_idle() {
        let session = SessionRuntime::spawn(bundle(5), SessionConfig::default()).unwrap();
        let mut notes = session.notifications();
        let err = session.start().await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Engine(EngineError::Precondition(Actuator::WaterPump))
        ));
        let note = notes.recv().await.unwrap();
        assert_eq!(note.level, NotificationLevel::Error);
        assert_eq!(session.snapshot().status, PlaybackStatus::Idle);
        session.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_follow_speed() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionRuntime::spawn(bundle(100), ready_config(dir.path())).unwrap();
        session.set_speed(10).await.unwrap();
        let started = tokio::time::Instant::now();
        session.start().await.unwrap();

        let mut snapshots = session.subscribe();
        snapshots.wait_for(|s| s.current_index == 5).await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(500));

        session.pause().await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(session.snapshot().current_index, 5);
        session.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn unsupported_speed_is_refused_locally() {
        let session = SessionRuntime::spawn(bundle(3), SessionConfig::default()).unwrap();
        let err = session.set_speed(7).await.unwrap_err();
        assert!(matches!(err, SessionError::Engine(EngineError::UnsupportedSpeed(7))));
        assert_eq!(session.snapshot().speed, Speed::X5);
        session.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_play_pauses_and_resumes() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionRuntime::spawn(bundle(50), ready_config(dir.path())).unwrap();
        assert_eq!(session.toggle_play().await.unwrap(), PlaybackStatus::Running);
        assert_eq!(session.toggle_play().await.unwrap(), PlaybackStatus::Paused);
        assert_eq!(session.toggle_play().await.unwrap(), PlaybackStatus::Running);
        session.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn plays_to_completion_and_stops_timer() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionRuntime::spawn(bundle(4), ready_config(dir.path())).unwrap();
        session.set_speed(50).await.unwrap();
        session.start().await.unwrap();
        let done = session.wait_until_completed().await.unwrap();
        assert!(!done.is_running);
        assert_eq!(done.alerts[0].kind, Some(AlertKind::SimulationComplete));

        let summary = session.shutdown().await.unwrap();
        assert_eq!(summary.ticks, 4);
        assert_eq!(summary.final_status, PlaybackStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn report_download_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionRuntime::spawn(bundle(3), ready_config(dir.path())).unwrap();
        let mut notes = session.notifications();
        let path = session.download_report().await.unwrap();
        assert!(path.ends_with("farming-simulation-report.txt"));
        assert_eq!(notes.recv().await.unwrap().message, REPORT_DOWNLOADED);
        session.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn report_failure_leaves_engine_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let config = SessionConfig {
            report_dir: blocker,
            ..ready_config(dir.path())
        };
        let session = SessionRuntime::spawn(bundle(3), config).unwrap();
        let mut notes = session.notifications();
        let before = session.snapshot();
        assert!(matches!(
            session.download_report().await,
            Err(SessionError::Report(_))
        ));
        assert_eq!(notes.recv().await.unwrap().message, REPORT_FAILED);
        let after = session.snapshot();
        assert_eq!(before.current_index, after.current_index);
        assert_eq!(before.status, after.status);
        session.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn commands_after_shutdown_fail_closed() {
        let session = SessionRuntime::spawn(bundle(3), SessionConfig::default()).unwrap();
        let other = session.clone();
        session.shutdown().await.unwrap();
        assert!(matches!(other.pause().await, Err(SessionError::Closed)));
        assert!(matches!(other.shutdown().await, Err(SessionError::Closed)));
    }
}
