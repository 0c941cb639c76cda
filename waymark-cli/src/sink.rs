//! Terminal notification sink.
//!
//! Renders show/cancel as styled terminal lines. Stands in for a platform
//! notification API during `waymark watch` sessions.

use std::sync::atomic::{AtomicU64, Ordering};

use console::style;
use waymark::notify::{NotificationHandle, NotificationSink, SinkError};

/// Prints notifications to stdout.
#[derive(Debug, Default)]
pub struct TerminalSink {
    next_id: AtomicU64,
}

impl TerminalSink {
    /// Create a terminal sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationSink for TerminalSink {
    fn show(&self, title: &str, body: &str) -> Result<NotificationHandle, SinkError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = NotificationHandle(format!("term-{id}"));

        println!(
            "{} {} {}",
            style("NEAR").green().bold(),
            style(title).bold(),
            style(body).dim()
        );

        Ok(handle)
    }

    fn cancel(&self, handle: &NotificationHandle) -> Result<(), SinkError> {
        println!(
            "{} notification {}",
            style("CLEARED").yellow(),
            style(handle).dim()
        );
        Ok(())
    }
}
