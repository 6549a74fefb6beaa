//! Tracing setup for Cinewatch
//!
//! The terminal UI owns stdout, so all log output goes to a file that is
//! overwritten on every run. `RUST_LOG` takes precedence over `--log-level`.

use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Name of the log file inside the log directory
pub const LOG_FILE_NAME: &str = "cinewatch-last-run.log";

/// Log levels selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Warning and error messages
    Warn,
    /// Informational, warning, and error messages
    Info,
    /// Debug, informational, warning, and error messages
    Debug,
    /// All messages including cache hits and misses
    Trace,
}

impl LogLevel {
    pub fn as_tracing_level(self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

/// Installs a global subscriber writing to `<logs_dir>/cinewatch-last-run.log`.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created, or if a
/// global subscriber is already installed.
pub fn init_tracing(level: LogLevel, logs_dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    create_dir_all(logs_dir)?;

    let log_file_path = logs_dir.join(LOG_FILE_NAME);
    let log_file = File::create(&log_file_path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_tracing_level().to_string()));

    let file_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .with_filter(filter);

    tracing_subscriber::registry().with(file_layer).try_init()?;

    tracing::info!(level = %level, file = %log_file_path.display(), "tracing initialized");

    Ok(log_file_path)
}
