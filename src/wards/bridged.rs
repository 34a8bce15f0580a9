//! # Monitored stages with a restart-proof output.
//!
//! Each generation gets its own output stream; a [`bridge`] stitches the
//! generations together so the consumer keeps one handle:
//!
//! ```text
//! Steward ──start(gen N)──► work(signal, interval, Emitter<T>) ──► Stream<T> (gen N)
//!                                                                       │
//!                              generations: Stream<Stream<T>> ◄─────────┘
//!                                          │
//!                                       bridge ──► caller's Stream<T>
//! ```
//!
//! Items the retired generation had already handed to the bridge are
//! delivered; an item it was still trying to send when cancelled is lost, and
//! the replacement starts its own sequence from scratch.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use crate::flow::{Emitter, Signal, Stream, bridge, channel};
use crate::heartbeat::Heartbeat;
use crate::wards::{Monitored, MonitoredFn, MonitoredRef};

/// Generations queued ahead of the bridge before new ones are refused.
const GENERATION_BACKLOG: usize = 16;

/// Wraps `work` so that every generation's output flows into one stream.
///
/// `work` receives the generation's signal, pulse interval and its own output
/// emitter, and returns its heartbeat. `signal` bounds the bridge itself.
/// Generations register in start order; if the bridge is more than
/// [`GENERATION_BACKLOG`] generations behind, the new generation's output is
/// refused (its sends report `Disconnected`) and it should exit, which the
/// steward sees as a stall.
///
/// # Example
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use std::time::Duration;
/// use stagevisor::{Pacemaker, Signal, Steward, bridged, heartbeat, flow};
///
/// let signal = Signal::new();
/// let (ward, numbers) = bridged(&signal, "numbers", |stage, interval, out| {
///     let (pulses, beats) = heartbeat();
///     tokio::spawn(async move {
///         let mut pacemaker = Pacemaker::new(pulses, interval);
///         for n in 1..=3 {
///             if pacemaker.send_with_pulse(&stage, &out, n).await.is_err() {
///                 return;
///             }
///         }
///         pacemaker.idle(&stage).await;
///     });
///     beats
/// });
///
/// let _steward_heartbeat = Steward::new(Duration::from_secs(1), ward)
///     .start_with(&signal, Duration::from_secs(3600));
/// let got = flow::take(&signal, numbers, 3).into_vec().await;
/// assert_eq!(got, vec![1, 2, 3]);
/// signal.cancel();
/// # }
/// ```
pub fn bridged<T, F>(
    signal: &Signal,
    name: impl Into<Cow<'static, str>>,
    work: F,
) -> (MonitoredRef, Stream<T>)
where
    T: Send + 'static,
    F: Fn(Signal, Duration, Emitter<T>) -> Heartbeat + Send + Sync + 'static,
{
    let (generations, pending) = Stream::with_capacity(GENERATION_BACKLOG);
    let output = bridge(signal, pending);

    let ward = MonitoredFn::arc(name, move |stage: Signal, interval: Duration| {
        let (out, stream) = channel();
        if !generations.try_send(stream) {
            tracing::warn!("bridge backlog full; generation output refused");
        }
        work(stage, interval, out)
    });
    (ward as Arc<dyn Monitored>, output)
}
