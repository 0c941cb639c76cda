//! Tracing subscriber bootstrap for binaries.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! binary's job. This module offers the two setups the CLI needs: stderr
//! output for interactive use, and a non-blocking daily-rolling file for
//! long-running watch sessions.

use std::io;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::EnvFilter;

/// Default filter when RUST_LOG is not set.
const DEFAULT_FILTER: &str = "waymark=info";

/// Logging configuration.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Log file path. None logs to stderr.
    pub file: Option<PathBuf>,
}

impl LogConfig {
    /// Log to stderr.
    pub fn stderr() -> Self {
        Self { file: None }
    }

    /// Log to a daily-rolling file next to the given path.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
        }
    }
}

/// Install the global tracing subscriber.
///
/// Returns a guard that must be held for the life of the process when file
/// logging is active; dropping it flushes and stops the background writer.
/// Calling twice is harmless (the second call is ignored), which keeps test
/// setups simple.
pub fn init(config: &LogConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // Local timestamps when the offset is knowable, UTC otherwise.
    let timer = OffsetTime::local_rfc_3339()
        .unwrap_or_else(|_| OffsetTime::new(time::UtcOffset::UTC, time::format_description::well_known::Rfc3339));

    match &config.file {
        Some(path) => {
            let directory = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| "waymark.log".to_string());

            let appender = tracing_appender::rolling::daily(directory, filename);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_timer(timer)
                .with_writer(writer)
                .with_ansi(false)
                .try_init();

            Some(guard)
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_timer(timer)
                .with_writer(io::stderr)
                .try_init();

            None
        }
    }
}
