//! Engine telemetry for observability and user feedback.
//!
//! Lock-free atomic counters record what the proximity loop is doing with
//! minimal overhead; display surfaces take point-in-time snapshots.
//!
//! ```text
//! Proximity Loop ────► EngineMetrics ────► MetricsSnapshot ────► Views
//!                      (atomic counters)   (point-in-time copy)   (CLI, logs)
//! ```
//!
//! The `logging` submodule bootstraps the tracing subscriber for binaries.

pub mod logging;

mod metrics;
mod snapshot;

pub use metrics::EngineMetrics;
pub use snapshot::MetricsSnapshot;
