//! # Event subscribers.
//!
//! ```text
//!   Steward ── publish(Event) ──► Bus ──► runtime listener ──► SubscriberSet
//!                                                                 │
//!                                               ┌─────────────────┼──────────────┐
//!                                               ▼                 ▼              ▼
//!                                          [queue 1]         [queue 2]   ...  [queue N]
//!                                               │                 │              │
//!                                       on_event(&Event)   on_event(&Event)     ...
//! ```
//!
//! Implement [`Subscribe`] to export restarts as metrics, alerts or audit
//! records. With the `logging` feature, [`LogWriter`] renders every event
//! through `tracing`.
//!
//! ```no_run
//! use async_trait::async_trait;
//! use stagevisor::{Event, EventKind, Subscribe};
//!
//! struct RestartCounter;
//!
//! #[async_trait]
//! impl Subscribe for RestartCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::WardUnhealthy {
//!             // bump a counter
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "restart-counter"
//!     }
//! }
//! ```

mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
