//! Location-sample producers for watch mode.
//!
//! Two producers feed the engine's sample channel:
//!
//! - stdin: reads `lat,lon` lines as they arrive (pipe a live feed in)
//! - replay: reads a recorded track file and paces the lines out on a
//!   fixed interval, optionally scaled by a speed factor
//!
//! Lines starting with `#` and blank lines are skipped. A malformed line is
//! reported and skipped; the stream keeps going.

use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;
use waymark::location::{LocationError, LocationSample};

/// Parse a `lat,lon` line. Returns None for blanks and comments.
pub fn parse_line(line: &str) -> Option<Result<(f64, f64), String>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let mut parts = trimmed.split(',');
    let result = (|| {
        let lat: f64 = parts.next()?.trim().parse().ok()?;
        let lon: f64 = parts.next()?.trim().parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((lat, lon))
    })();

    Some(result.ok_or_else(|| format!("expected 'lat,lon', got '{trimmed}'")))
}

/// Pump `lat,lon` lines from stdin into the engine until EOF.
pub async fn pump_stdin(tx: mpsc::Sender<LocationSample>) -> Result<(), LocationError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return Err(LocationError::Unavailable(e.to_string())),
        };
        match parse_line(&line) {
            Some(Ok((lat, lon))) => {
                if tx.send(LocationSample::new(lat, lon)).await.is_err() {
                    // Engine stopped; nothing left to feed.
                    break;
                }
            }
            Some(Err(msg)) => warn!(%msg, "Skipping malformed sample line"),
            None => {}
        }
    }

    Ok(())
}

/// Replay a recorded track file, one sample per `interval`.
pub async fn pump_replay(
    path: &Path,
    interval: Duration,
    tx: mpsc::Sender<LocationSample>,
) -> Result<(), LocationError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => LocationError::PermissionDenied,
        _ => LocationError::Unavailable(format!("{}: {e}", path.display())),
    })?;

    for line in content.lines() {
        match parse_line(line) {
            Some(Ok((lat, lon))) => {
                if tx.send(LocationSample::new(lat, lon)).await.is_err() {
                    break;
                }
                tokio::time::sleep(interval).await;
            }
            Some(Err(msg)) => warn!(%msg, "Skipping malformed sample line"),
            None => {}
        }
    }

    Ok(())
}
