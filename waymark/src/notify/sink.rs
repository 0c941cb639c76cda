//! The notification delivery boundary.

use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tracing::info;

/// Errors raised by a notification sink.
///
/// Sink failures are recoverable: the tracker keeps its record table
/// consistent and the proximity loop naturally retries on the next sample.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The platform revoked notification permission.
    #[error("Notification permission denied")]
    PermissionDenied,

    /// Displaying the notification failed.
    #[error("Notification delivery failed: {0}")]
    Delivery(String),

    /// Cancelling the notification failed.
    #[error("Notification cancellation failed: {0}")]
    Cancellation(String),
}

/// Opaque token identifying a displayed notification.
///
/// The sink mints these; the tracker stores them and hands them back for
/// cancellation. Their content is meaningful only to the sink that issued
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationHandle(pub String);

impl std::fmt::Display for NotificationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NotificationHandle {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A destination that can display and cancel notifications by handle.
///
/// Implementations should return promptly: the proximity loop performs sink
/// calls inline in its serialized evaluation pass, and the at-most-one-record
/// invariant already bounds in-flight work at one call per marker.
pub trait NotificationSink: Send + Sync {
    /// Display a notification, returning a handle for later cancellation.
    fn show(&self, title: &str, body: &str) -> Result<NotificationHandle, SinkError>;

    /// Cancel a previously displayed notification.
    fn cancel(&self, handle: &NotificationHandle) -> Result<(), SinkError>;
}

/// A sink that emits notifications to the tracing log.
///
/// Useful headless: tests, daemons without a display surface, and as a
/// fallback when no platform sink is wired up.
#[derive(Debug, Default)]
pub struct TracingSink {
    next_id: AtomicU64,
}

impl TracingSink {
    /// Create a new tracing sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationSink for TracingSink {
    fn show(&self, title: &str, body: &str) -> Result<NotificationHandle, SinkError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = NotificationHandle(format!("log-{id}"));
        info!(handle = %handle, title, body, "Notification shown");
        Ok(handle)
    }

    fn cancel(&self, handle: &NotificationHandle) -> Result<(), SinkError> {
        info!(handle = %handle, "Notification cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_sink_mints_unique_handles() {
        let sink = TracingSink::new();
        let a = sink.show("A", "body").unwrap();
        let b = sink.show("B", "body").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tracing_sink_cancel_accepts_any_handle() {
        let sink = TracingSink::new();
        let handle = NotificationHandle("log-42".to_string());
        assert!(sink.cancel(&handle).is_ok());
    }
}
