//! # The start-a-stage contract.
//!
//! A [`Monitored`] knows how to start one generation of a long-running stage.
//! The steward calls [`Monitored::start`] once per generation, with a fresh
//! signal each time, and watches the returned heartbeat.

use std::sync::Arc;
use std::time::Duration;

use crate::flow::Signal;
use crate::heartbeat::Heartbeat;

/// A stage that can be started under supervision.
///
/// ### Implementation requirements
/// - `start` must not block: spawn the stage and return its heartbeat.
/// - The stage must pulse at least every `pulse_interval` while healthy.
/// - The stage must exit promptly once `signal` fires.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use stagevisor::{Heartbeat, Monitored, Pacemaker, Signal, heartbeat};
///
/// struct Idler;
///
/// impl Monitored for Idler {
///     fn name(&self) -> &str { "idler" }
///
///     fn start(&self, signal: Signal, pulse_interval: Duration) -> Heartbeat {
///         let (pulses, beats) = heartbeat();
///         tokio::spawn(async move {
///             Pacemaker::new(pulses, pulse_interval).idle(&signal).await;
///         });
///         beats
///     }
/// }
/// ```
pub trait Monitored: Send + Sync + 'static {
    /// Returns a stable, human-readable name.
    fn name(&self) -> &str;

    /// Starts one generation of the stage under `signal`.
    fn start(&self, signal: Signal, pulse_interval: Duration) -> Heartbeat;
}

/// Shared handle to a monitored stage.
pub type MonitoredRef = Arc<dyn Monitored>;
