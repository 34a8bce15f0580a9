//! # Event bus for supervision events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`]:
//!
//! ```text
//!   Steward 1 ──┐
//!   Steward 2 ──┼──► Bus ──► runtime listener ──► AliveTracker + SubscriberSet
//!   Runtime   ──┘
//! ```
//!
//! ## Rules
//! - `publish()` never blocks and never fails; with no receivers the event is dropped.
//! - One shared ring buffer of `capacity` events; lagging receivers get
//!   `RecvError::Lagged(n)` and skip the `n` oldest.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for supervision events. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus holding the last `capacity` events (min 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to every current receiver (fire-and-forget).
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates an independent receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
