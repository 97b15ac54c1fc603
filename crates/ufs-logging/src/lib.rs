//! ---
//! ufs_section: "03-persistence-logging"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Structured logging adapters and sinks."
//! ufs_version: "v0.0.0-prealpha"
//! ufs_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Session-scoped structured logging on top of `tracing`.

use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

pub mod macros;

/// Initialize a baseline tracing subscriber suitable for development and tests.
pub fn init() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer())
        .try_init();
}

/// Structured logging context propagated by the convenience macros.
#[derive(Debug, Default, Clone)]
pub struct LogContext<'a> {
    /// Session identifier.
    pub session: Option<&'a str>,
    /// Index into the reading series.
    pub tick: Option<u64>,
    /// Playback multiplier.
    pub speed: Option<u32>,
    /// Playback status (idle, running, paused, completed).
    pub status: Option<&'a str>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a session identifier.
    pub fn with_session(mut self, session: &'a str) -> Self {
        self.session = Some(session);
        self
    }

    /// Attach a series index.
    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }

    /// Attach a playback multiplier.
    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Attach a playback status descriptor.
    pub fn with_status(mut self, status: &'a str) -> Self {
        self.status = Some(status);
        self
    }
}

/// High-level outcome used when emitting lifecycle log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEventOutcome {
    /// The operation completed successfully.
    Success,
    /// The operation was refused because a precondition did not hold.
    Rejected,
    /// The operation failed.
    Fault,
}

impl SystemEventOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            SystemEventOutcome::Success => "success",
            SystemEventOutcome::Rejected => "rejected",
            SystemEventOutcome::Fault => "fault",
        }
    }

    fn level(&self) -> Level {
        match self {
            SystemEventOutcome::Success | SystemEventOutcome::Rejected => Level::INFO,
            SystemEventOutcome::Fault => Level::ERROR,
        }
    }
}

/// Emit a standardized session event with an outcome.
pub fn log_system_event(
    context: Option<&LogContext>,
    event: &str,
    message: &str,
    outcome: SystemEventOutcome,
) {
    let ctx = context.cloned().unwrap_or_default();
    // `tracing::event!` needs a constant level, so dispatch on it here.
    if outcome.level() == Level::ERROR {
        tracing::event!(
            Level::ERROR,
            event,
            outcome = outcome.as_str(),
            session = ctx.session.unwrap_or(""),
            tick = ctx.tick.unwrap_or_default(),
            speed = ctx.speed.unwrap_or_default(),
            status = ctx.status.unwrap_or(""),
            message = %message
        );
    } else {
        tracing::event!(
            Level::INFO,
            event,
            outcome = outcome.as_str(),
            session = ctx.session.unwrap_or(""),
            tick = ctx.tick.unwrap_or_default(),
            speed = ctx.speed.unwrap_or_default(),
            status = ctx.status.unwrap_or(""),
            message = %message
        );
    }
}
