//! # Steward liveness tracker with sequence-based ordering.
//!
//! ```text
//! Steward ──► Bus ──► runtime listener ──► AliveTracker::update()
//!                                                 │
//!                                                 ▼
//!                                     HashMap<String, StewardEntry>
//! ```
//!
//! ## Rules
//! - Only `StewardStarted` / `StewardStopped` change the alive flag.
//! - Other events for the same steward only advance `last_seq`.
//! - Events with `seq <= last_seq` are stale and ignored.
//! - Reads are eventually consistent with the bus.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::events::{Event, EventKind};

#[derive(Debug, Clone, Copy)]
struct StewardEntry {
    last_seq: u64,
    alive: bool,
}

/// Names of stewards that have started and not yet stopped.
pub(crate) struct AliveTracker {
    state: RwLock<HashMap<String, StewardEntry>>,
}

impl AliveTracker {
    pub(crate) fn new() -> Self {
        Self {
            state: RwLock::new(HashMap::new()),
        }
    }

    /// Applies `ev`; returns `true` if the alive flag changed.
    pub(crate) async fn update(&self, ev: &Event) -> bool {
        let Some(name) = ev.steward.as_deref() else {
            return false;
        };
        let alive = match ev.kind {
            EventKind::StewardStarted => Some(true),
            EventKind::StewardStopped => Some(false),
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => return false,
            _ => None,
        };

        let mut state = self.state.write().await;
        let entry = state.entry(name.to_owned()).or_insert(StewardEntry {
            last_seq: 0,
            alive: false,
        });
        if ev.seq <= entry.last_seq {
            return false;
        }
        entry.last_seq = ev.seq;
        match alive {
            Some(flag) if flag != entry.alive => {
                entry.alive = flag;
                true
            }
            _ => false,
        }
    }

    /// Sorted names of live stewards.
    pub(crate) async fn snapshot(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut names: Vec<String> = state
            .iter()
            .filter(|(_, e)| e.alive)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(kind: EventKind, name: &str) -> Event {
        Event::new(kind).with_steward(name)
    }

    #[tokio::test]
    async fn start_and_stop_toggle_membership() {
        let alive = AliveTracker::new();
        assert!(alive.update(&ev(EventKind::StewardStarted, "b")).await);
        assert!(alive.update(&ev(EventKind::StewardStarted, "a")).await);
        assert!(!alive.update(&ev(EventKind::WardUnhealthy, "a")).await);
        assert_eq!(alive.snapshot().await, vec!["a", "b"]);

        assert!(alive.update(&ev(EventKind::StewardStopped, "b")).await);
        assert_eq!(alive.snapshot().await, vec!["a"]);
    }

    #[tokio::test]
    async fn stale_events_are_ignored() {
        let alive = AliveTracker::new();
        let started = ev(EventKind::StewardStarted, "w");
        let stopped = ev(EventKind::StewardStopped, "w");

        assert!(!alive.update(&stopped).await);
        assert!(!alive.update(&started).await);
        assert!(alive.snapshot().await.is_empty());
    }
}
