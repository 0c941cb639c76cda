//! Watch command - run the proximity engine against a location stream.
//!
//! Samples arrive either from stdin (`lat,lon` lines, for piping a live
//! feed) or from a recorded track file replayed on an interval. Marker
//! proximity transitions print through the terminal sink as they happen;
//! Ctrl-C stops the loop without cancelling notifications that are still
//! showing, and a metrics summary prints on exit.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use console::style;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use waymark::app::{App, AppConfig};

use super::common;
use crate::error::CliError;
use crate::sink::TerminalSink;
use crate::source;

/// Arguments for the watch command.
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Proximity threshold in meters (overrides config)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Read samples from stdin (the default)
    #[arg(long, conflicts_with = "replay")]
    pub stdin: bool,

    /// Replay samples from a recorded track file
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Replay speed multiplier (2.0 = twice as fast)
    #[arg(long, default_value_t = 1.0)]
    pub speed: f64,
}

/// Run the watch command.
pub fn run(args: WatchArgs) -> Result<(), CliError> {
    if args.speed <= 0.0 || !args.speed.is_finite() {
        return Err(CliError::Input(format!(
            "--speed must be positive, got {}",
            args.speed
        )));
    }
    if let Some(threshold) = args.threshold {
        if threshold <= 0.0 || !threshold.is_finite() {
            return Err(CliError::Input(format!(
                "--threshold must be positive, got {threshold}"
            )));
        }
    }

    let config_file = common::load_config()?;
    let _log_guard = waymark::telemetry::logging::init(&waymark::telemetry::logging::LogConfig {
        file: config_file.log_file.clone(),
    });

    let mut app_config = AppConfig::from_config_file(&config_file);
    if let Some(threshold) = args.threshold {
        app_config.proximity.threshold_meters = threshold;
    }

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Config(format!("Failed to create Tokio runtime: {e}")))?;
    runtime.block_on(run_watch(app_config, config_file, args))
}

async fn run_watch(
    app_config: AppConfig,
    config_file: waymark::config::ConfigFile,
    args: WatchArgs,
) -> Result<(), CliError> {
    let store = Arc::new(common::open_store(&config_file)?);
    let sink = Arc::new(TerminalSink::new());

    let threshold = app_config.proximity.threshold_meters;
    let app = App::start(app_config, store, sink)?;

    let markers = app.list_markers()?;
    println!(
        "Watching {} markers, threshold {:.0} m. {}",
        style(markers.len()).bold(),
        threshold,
        style("Ctrl-C to stop.").dim()
    );

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || cancel.cancel())
            .map_err(|e| CliError::Config(format!("Failed to install Ctrl-C handler: {e}")))?;
    }

    let sample_tx = app.sample_sender();
    let replay = args.replay.clone();
    let interval = Duration::from_secs_f64(1.0 / args.speed);

    let mut producer = tokio::spawn(async move {
        match replay {
            Some(path) => source::pump_replay(&path, interval, sample_tx).await,
            None => source::pump_stdin(sample_tx).await,
        }
    });

    tokio::select! {
        _ = cancel.cancelled() => {
            println!("\nStopping.");
            producer.abort();
        }
        result = &mut producer => {
            match result {
                Ok(Ok(())) => println!("Sample stream ended."),
                Ok(Err(e)) => {
                    // Losing location is fatal to the feature, not the process:
                    // report it and fall through to the normal exit path.
                    warn!(error = %e, "Location source failed");
                    println!("{} {}", style("Location source failed:").red(), e);
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => warn!(error = %e, "Sample producer panicked"),
            }
        }
    }

    let live = app.active_notifications();
    if !live.is_empty() {
        println!(
            "{} notifications still showing (cleared on marker delete or restart).",
            live.len()
        );
    }

    let snapshot = app.metrics_snapshot();
    app.shutdown().await;
    println!("{snapshot}");

    Ok(())
}
