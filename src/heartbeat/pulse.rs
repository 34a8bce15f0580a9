//! Pulse values and the heartbeat stream.
//!
//! A pulse reaches the monitor only if the monitor is waiting for one when it
//! is sent. Pulses sent between waits are dropped, so a stage that pulsed once
//! and then stalled never looks alive later.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::time::Instant;

use crate::flow::{Emitter, Stream};

/// "Alive at `at`". Carries no payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pulse {
    /// When the stage emitted the pulse.
    pub at: Instant,
}

impl Pulse {
    /// A pulse stamped with the current (tokio) time.
    pub fn now() -> Self {
        Self { at: Instant::now() }
    }
}

/// Liveness stream read by a monitor.
///
/// Closes once the stage exits and its [`PulseEmitter`] is dropped.
#[derive(Debug)]
pub struct Heartbeat {
    beats: Stream<Pulse>,
    listening: Arc<AtomicBool>,
}

impl Heartbeat {
    /// Waits for a pulse sent after this call began; `None` once the stage exited.
    ///
    /// Cancel-safe; use it as a `select!` arm.
    pub async fn recv(&mut self) -> Option<Pulse> {
        let since = Instant::now();
        let _listening = Listening::enter(&self.listening);
        loop {
            let pulse = self.beats.recv().await?;
            if pulse.at >= since {
                return Some(pulse);
            }
        }
    }
}

/// Marks the monitor as waiting for as long as a `recv` future is alive.
struct Listening<'a>(&'a AtomicBool);

impl<'a> Listening<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for Listening<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Producer half of a [`Heartbeat`], owned by the stage it reports on.
#[derive(Debug)]
pub struct PulseEmitter {
    out: Emitter<Pulse>,
    listening: Arc<AtomicBool>,
}

impl PulseEmitter {
    /// Offers one pulse without waiting.
    ///
    /// Returns `false` if it was dropped: nobody was waiting, or a pulse is
    /// already pending.
    pub fn pulse(&self) -> bool {
        self.listening.load(Ordering::Acquire) && self.out.try_send(Pulse::now())
    }

    /// Returns `true` once nobody reads the heartbeat any more.
    pub fn is_closed(&self) -> bool {
        self.out.is_closed()
    }
}

/// Creates a heartbeat pair.
pub fn heartbeat() -> (PulseEmitter, Heartbeat) {
    let (out, beats) = Stream::with_capacity(1);
    let listening = Arc::new(AtomicBool::new(false));
    (
        PulseEmitter {
            out,
            listening: Arc::clone(&listening),
        },
        Heartbeat { beats, listening },
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn pulse_without_a_waiting_monitor_is_dropped() {
        let (emitter, mut hb) = heartbeat();
        assert!(!emitter.pulse());

        let beat = tokio::spawn(async move { hb.recv().await });
        tokio::task::yield_now().await;
        assert!(emitter.pulse());
        assert!(!emitter.pulse(), "a second pulse must not queue");
        assert!(beat.await.expect("join").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn pulse_left_from_an_abandoned_wait_is_stale() {
        let (emitter, mut hb) = heartbeat();
        {
            let mut wait = std::pin::pin!(hb.recv());
            assert!(futures::poll!(&mut wait).is_pending());
            assert!(emitter.pulse());
        }

        tokio::time::sleep(Duration::from_secs(10)).await;
        let late = tokio::time::timeout(Duration::from_secs(1), hb.recv()).await;
        assert!(late.is_err(), "stale pulse reported as current");
        drop(emitter);
    }

    #[tokio::test]
    async fn dropping_emitter_closes_heartbeat() {
        let (emitter, mut hb) = heartbeat();
        drop(emitter);
        assert_eq!(hb.recv().await, None);
    }
}
