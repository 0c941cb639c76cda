//! Notification delivery and per-marker notification state.
//!
//! Split in two layers:
//!
//! - [`NotificationSink`] - the delivery boundary. Anything that can display
//!   and cancel a notification by handle implements it (platform APIs, a
//!   terminal, a test recorder).
//! - [`NotificationTracker`] - owns the record table mapping marker identity
//!   to its live notification, and guarantees each marker has at most one
//!   live notification regardless of how often the proximity loop re-reports
//!   the same state.

mod sink;
mod tracker;

pub use sink::{NotificationHandle, NotificationSink, SinkError, TracingSink};
pub use tracker::{ActiveNotification, NotificationTracker, Transition};
