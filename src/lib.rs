//! # stagevisor
//!
//! **Stagevisor** builds cancellable stream pipelines on tokio and keeps their
//! long-running stages alive with heartbeat supervision.
//!
//! Two layers:
//! - [`flow`]: stages connected by single-owner streams, every one of them
//!   bounded by a [`Signal`]. Sources, `map`/`filter`/`take`, fan-out/fan-in,
//!   `tee`, `bridge`, replicated requests.
//! - Supervision: a [`Steward`] watches a [`Monitored`] stage through its
//!   [`Heartbeat`] and replaces it when it stays silent past a deadline.
//!
//! ## Architecture
//! ```text
//!                  Signal (root)
//!                       │ any_of(own, parent)
//!     ┌─────────────────┼──────────────────────────────┐
//!     ▼                 ▼                              ▼
//! ┌──────────┐   ┌──────────┐   Stream<T>   ┌──────────────┐
//! │ generator│──►│  map     │──────────────►│ fan_out ...  │──► consumer
//! └──────────┘   └──────────┘               └──────────────┘
//!
//! ┌─────────────────────────────┐  Heartbeat  ┌───────────────────────────┐
//! │ Ward (Monitored::start)     │────────────►│ Steward                   │──► Heartbeat
//! │ Pacemaker.send_with_pulse() │             │ Starting → Monitoring     │    (own pulses)
//! └─────────────────────────────┘  cancel own │   ⇄ Restarting → Stopped  │
//!               ▲─────────────────────────────│                           │
//!                                             └─────────────┬─────────────┘
//!                                                           │ publish(Event)
//!                                                           ▼
//!                              Bus ──► listener ──► AliveTracker + SubscriberSet
//! ```
//!
//! ## Closing
//! A stream closes when its [`Emitter`] is dropped. Each stage owns its
//! emitters, so every exit path (finished input, cancellation, a failed
//! item under [`FailurePolicy::Stop`]) closes its outputs.
//!
//! ## Example
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use stagevisor::{Signal, flow};
//!
//! let signal = Signal::new();
//! let words = flow::repeat(&signal, vec!["I", "am."]);
//! let first = flow::take(&signal, words, 5).into_vec().await;
//! assert_eq!(first.join(" "), "I am. I am. I");
//! signal.cancel();
//! # }
//! ```
//!
//! ## Features
//! | Feature   | Description                                  |
//! |-----------|----------------------------------------------|
//! | `logging` | Exports [`LogWriter`], a `tracing` subscriber |

pub mod flow;

mod core;
mod error;
mod events;
mod heartbeat;
mod policies;
mod subscribers;
mod wards;

pub use crate::core::{Config, Runtime, RuntimeBuilder, Steward};
pub use error::{RuntimeError, StageError, StreamError};
pub use events::{Bus, Event, EventKind};
pub use flow::{Emitter, FailurePolicy, Signal, Stream};
pub use heartbeat::{
    Heartbeat, Liveness, Pacemaker, Pulse, PulseEmitter, first_beat, heartbeat, next_beat,
    pulse_per_item, pulsing_generator,
};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use subscribers::{Subscribe, SubscriberSet};
pub use wards::{Monitored, MonitoredFn, MonitoredRef, bridged};

#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
