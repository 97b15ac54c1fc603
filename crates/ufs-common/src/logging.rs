//! ---
//! ufs_section: "01-core-functionality"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Tracing setup for the command-line dashboard host."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
//! Stdout belongs to the host's own output (notifications, summaries), so
//! console events are written to stderr and kept quiet unless asked for. The
//! rolling file keeps the fuller record.
use std::io::IsTerminal;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::daily;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

const LOG_ENV: &str = "UFS_LOG";

/// Console rendering for stderr events. The log file is always JSON.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    StructuredJson,
    #[default]
    Pretty,
}

/// Destination of one tracing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sink {
    Console,
    File,
}

impl Sink {
    fn default_directive(self, verbose: bool) -> &'static str {
        match (self, verbose) {
            (_, true) => "debug",
            (Sink::Console, false) => "warn",
            (Sink::File, false) => "info",
        }
    }
}

/// Keeps the file writer alive. Dropping it flushes buffered lines.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: WorkerGuard,
}

/// Directive from `UFS_LOG`, then `RUST_LOG`. Blank values count as unset.
fn env_directive() -> Option<String> {
    [LOG_ENV, "RUST_LOG"]
        .into_iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

fn directive_for(sink: Sink, verbose: bool, env: Option<&str>) -> String {
    match env {
        Some(directive) => directive.to_string(),
        None => sink.default_directive(verbose).to_string(),
    }
}

fn sink_filter(sink: Sink, verbose: bool, env: Option<&str>) -> EnvFilter {
    let directive = directive_for(sink, verbose, env);
    EnvFilter::try_new(&directive).unwrap_or_else(|err| {
        let fallback = sink.default_directive(verbose);
        eprintln!("invalid {LOG_ENV} directive '{directive}' ({err}); using {fallback}");
        EnvFilter::new(fallback)
    })
}

/// Install the subscriber for `service_name`.
///
/// Console events go to stderr at `warn` (`debug` when `verbose`). The daily
/// rolling JSON file under `config.directory` records `info` and up (`debug`
/// when `verbose`). A directive in `UFS_LOG` or `RUST_LOG` replaces both
/// defaults. Keep the returned guard until exit.
pub fn init_tracing(service_name: &str, config: &LoggingConfig, verbose: bool) -> Result<LogGuard> {
    std::fs::create_dir_all(&config.directory)?;
    let prefix = config.file_prefix.as_deref().unwrap_or(service_name);
    let (file_writer, file_guard) =
        tracing_appender::non_blocking(daily(&config.directory, format!("{prefix}.log")));
    let env = env_directive();

    let console_layer = match config.format {
        LogFormat::StructuredJson => fmt::layer()
            .with_target(false)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .compact()
            .without_time()
            .with_target(false)
            .with_ansi(std::io::stderr().is_terminal())
            .with_writer(std::io::stderr)
            .boxed(),
    }
    .with_filter(sink_filter(Sink::Console, verbose, env.as_deref()));

    let file_layer = fmt::layer()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .json()
        .with_writer(file_writer)
        .with_filter(sink_filter(Sink::File, verbose, env.as_deref()));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .ok();

    debug!(service = %service_name, log_dir = %config.directory.display(), "tracing ready");
    Ok(LogGuard { _file: file_guard })
}
