//! Interval pulse source for stages that may block.

use std::time::Duration;

use tokio::time::{self, Interval, MissedTickBehavior};

use crate::error::StreamError;
use crate::flow::{Emitter, Signal};
use crate::heartbeat::{FAR_FUTURE, PulseEmitter, instant_after};

/// Smallest accepted pulse period; tokio intervals reject a zero period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Emits a pulse every `period`, driven by the owning stage's `select!` loop.
///
/// The first tick fires one `period` after creation; missed ticks are skipped,
/// never replayed in a burst.
#[derive(Debug)]
pub struct Pacemaker {
    interval: Interval,
    emitter: PulseEmitter,
}

impl Pacemaker {
    /// Creates a pacemaker pulsing on `emitter` every `period` (min 1ms).
    ///
    /// Periods beyond a few decades, `Duration::MAX` included, mean "never tick".
    pub fn new(emitter: PulseEmitter, period: Duration) -> Self {
        let period = period.clamp(MIN_PERIOD, FAR_FUTURE);
        let mut interval = time::interval_at(instant_after(period), period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval, emitter }
    }

    /// Waits for the next tick. Cancel-safe; use it as a `select!` arm.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }

    /// Offers a pulse immediately (best-effort).
    pub fn pulse(&self) -> bool {
        self.emitter.pulse()
    }

    /// Sends `value` on `out`, pulsing on every tick while the send is blocked.
    pub async fn send_with_pulse<T>(
        &mut self,
        signal: &Signal,
        out: &Emitter<T>,
        value: T,
    ) -> Result<(), StreamError> {
        let send = out.deliver(value);
        tokio::pin!(send);
        loop {
            tokio::select! {
                biased;
                _ = signal.cancelled() => return Err(StreamError::Cancelled),
                res = &mut send => return res,
                _ = self.interval.tick() => {
                    self.emitter.pulse();
                }
            }
        }
    }

    /// Idles until `signal` fires, still pulsing on every tick.
    pub async fn idle(&mut self, signal: &Signal) {
        loop {
            tokio::select! {
                biased;
                _ = signal.cancelled() => return,
                _ = self.interval.tick() => {
                    self.emitter.pulse();
                }
            }
        }
    }
}
