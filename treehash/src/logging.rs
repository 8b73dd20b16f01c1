//! Logging setup.
//!
//! Console and log file output through `tracing-subscriber`. The log file is
//! opened in append mode and shared with the change log, so one file holds
//! the timestamped progress lines of every run plus the change summaries.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable that overrides the log filter.
pub const LOG_ENV: &str = "TREEHASH_LOG";

/// Where console log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Console {
    Stdout,
    /// Used in JSON mode so stdout carries only the JSON document.
    Stderr,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `treehash_core=debug`.
    pub level: String,
    pub console: Console,
    /// Colored console output.
    pub color: bool,
    /// Append log lines to this file as well.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: Console::Stdout,
            color: true,
            file: None,
        }
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    build_subscriber(config)?
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

/// Build the subscriber without installing it: a console layer plus, when
/// configured, an append-mode file layer.
pub fn build_subscriber(config: &LogConfig) -> Result<impl Subscriber + Send + Sync + 'static> {
    let filter = build_env_filter(config)?;

    let console_writer = match config.console {
        Console::Stdout => BoxMakeWriter::new(std::io::stdout),
        Console::Stderr => BoxMakeWriter::new(std::io::stderr),
    };
    let console_layer = fmt::layer()
        .with_target(false)
        .with_timer(ChronoLocal::rfc_3339())
        .with_ansi(config.color)
        .with_writer(console_writer);

    let file_layer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoLocal::rfc_3339())
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    Ok(Registry::default()
        .with(filter)
        .with(console_layer)
        .with(file_layer))
}

/// Build the filter from `TREEHASH_LOG`, falling back to the configured level.
fn build_env_filter(config: &LogConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log level: {}", config.level))
}
