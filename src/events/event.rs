//! # Events emitted by stewards and the runtime.
//!
//! [`EventKind`] covers three groups:
//! - **Ward lifecycle**: starting, healthy, unhealthy, restart scheduled
//! - **Steward lifecycle**: started, stopped
//! - **Runtime**: shutdown, grace, subscriber overflow/panic
//!
//! Every [`Event`] carries a global monotonic `seq` for ordering.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use stagevisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::WardUnhealthy)
//!     .with_steward("ingest")
//!     .with_generation(3)
//!     .with_timeout(Duration::from_secs(1));
//!
//! assert_eq!(ev.kind, EventKind::WardUnhealthy);
//! assert_eq!(ev.generation, Some(3));
//! assert_eq!(ev.timeout_ms, Some(1000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Classification of supervision events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked while handling an event.
    ///
    /// Sets `steward` (subscriber name) and `reason` (panic message).
    SubscriberPanicked,

    /// Subscriber queue was full or closed; the event was dropped for it.
    ///
    /// Sets `steward` (subscriber name) and `reason`.
    SubscriberOverflow,

    // === Runtime events ===
    /// Shutdown requested (OS signal or explicit call).
    ShutdownRequested,

    /// Every steward stopped within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some stewards did not stop in time.
    GraceExceeded,

    // === Steward lifecycle ===
    /// Monitoring loop started.
    ///
    /// Sets `steward`.
    StewardStarted,

    /// Monitoring loop reached `Stopped`; its heartbeat is closed.
    ///
    /// Sets `steward`, `generation` (last ward).
    StewardStopped,

    // === Ward lifecycle ===
    /// A ward generation is being started.
    ///
    /// Sets `steward`, `generation` (1-based).
    WardStarting,

    /// First pulse of a ward generation observed.
    ///
    /// Sets `steward`, `generation`.
    WardHealthy,

    /// No ward pulse within the deadline; the ward will be torn down.
    ///
    /// Sets `steward`, `generation`, `timeout_ms`.
    WardUnhealthy,

    /// Replacement delayed by backoff.
    ///
    /// Sets `steward`, `generation` (the retired one), `delay_ms`.
    RestartScheduled,
}

/// Supervision event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Steward (or subscriber) name, if applicable.
    pub steward: Option<Arc<str>>,
    /// Ward generation (starting from 1).
    pub generation: Option<u64>,
    /// Ward deadline in milliseconds.
    pub timeout_ms: Option<u32>,
    /// Restart delay in milliseconds.
    pub delay_ms: Option<u32>,
    /// Human-readable reason.
    pub reason: Option<Arc<str>>,
}

fn millis(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}

impl Event {
    /// Creates an event with the current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            steward: None,
            generation: None,
            timeout_ms: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches a steward name.
    #[inline]
    pub fn with_steward(mut self, name: impl Into<Arc<str>>) -> Self {
        self.steward = Some(name.into());
        self
    }

    /// Attaches a ward generation.
    #[inline]
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Attaches a ward deadline (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(millis(d));
        self
    }

    /// Attaches a restart delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(millis(d));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_steward(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_steward(subscriber)
            .with_reason(info)
    }
}
