//! # Function-backed monitored stage.
//!
//! [`MonitoredFn`] wraps `F: Fn(Signal, Duration) -> Heartbeat`. Each call
//! starts a fresh generation; nothing is shared between generations unless
//! the closure captures it explicitly.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use crate::flow::Signal;
use crate::heartbeat::Heartbeat;
use crate::wards::Monitored;

/// Closure-backed [`Monitored`].
///
/// ## Example
/// ```rust
/// use stagevisor::{MonitoredFn, MonitoredRef, heartbeat};
///
/// let ward: MonitoredRef = MonitoredFn::arc("silent", |_signal, _interval| {
///     let (_pulses, beats) = heartbeat();
///     beats
/// });
/// assert_eq!(ward.name(), "silent");
/// ```
pub struct MonitoredFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> MonitoredFn<F>
where
    F: Fn(Signal, Duration) -> Heartbeat + Send + Sync + 'static,
{
    /// Creates a new function-backed stage.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the stage as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> Monitored for MonitoredFn<F>
where
    F: Fn(Signal, Duration) -> Heartbeat + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, signal: Signal, pulse_interval: Duration) -> Heartbeat {
        (self.f)(signal, pulse_interval)
    }
}
