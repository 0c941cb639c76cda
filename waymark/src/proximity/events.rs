//! Broadcast of proximity transitions to observers.
//!
//! Display surfaces (a map view, the CLI watch output) subscribe to learn
//! when markers enter or leave range without polling the tracker. Publishing
//! never blocks the evaluation loop: a lagging or absent subscriber just
//! misses events.

use tokio::sync::broadcast;

use crate::marker::MarkerId;

/// Default buffered events per subscriber.
const DEFAULT_EVENT_CAPACITY: usize = 32;

/// A proximity state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityEvent {
    /// The marker crossed into the threshold; a notification was shown.
    Entered { marker_id: MarkerId },
    /// The marker left the threshold or was deleted; its notification was
    /// cancelled.
    Exited { marker_id: MarkerId },
}

impl ProximityEvent {
    /// The marker this event concerns.
    pub fn marker_id(&self) -> MarkerId {
        match self {
            ProximityEvent::Entered { marker_id } | ProximityEvent::Exited { marker_id } => {
                *marker_id
            }
        }
    }
}

/// Clonable publisher/subscription point for proximity events.
#[derive(Debug, Clone)]
pub struct ProximityEvents {
    tx: broadcast::Sender<ProximityEvent>,
}

impl Default for ProximityEvents {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl ProximityEvents {
    /// Create an event channel buffering `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ProximityEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Absent subscribers are not an error.
    pub fn publish(&self, event: ProximityEvent) {
        let _ = self.tx.send(event);
    }
}
