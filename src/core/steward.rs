//! # Steward: watches one ward and replaces it when it goes silent.
//!
//! A [`Steward`] owns at most one live [`Ward`] at a time and drives it
//! through an explicit state machine:
//!
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            ▼                                              │
//!   Starting ──► Monitoring ──(deadline, no ward pulse)──► Restarting
//!                    │                                      │
//!                    └──(parent fired)──► Stopped ◄──(parent fired during backoff)
//! ```
//!
//! ## Monitoring cycle
//! One `select!` races, in this order:
//! - the parent signal → `Stopped`;
//! - a ward pulse → the deadline moves to `now + timeout`;
//! - the steward's own tick → a pulse to whoever watches the steward;
//! - the deadline → `Restarting`.
//!
//! A ward heartbeat that closes is no longer polled; the deadline then
//! expires and the ward is replaced like any other silent ward.
//!
//! ## Rules
//! - The deadline is armed when a ward starts, so a ward that never pulses is
//!   replaced after exactly one `timeout`.
//! - One missed window produces exactly one restart.
//! - Retiring a ward cancels its private signal; the parent is never cancelled.
//! - Reaching `Stopped` closes the steward's heartbeat.
//! - The steward keeps pulsing during restart backoff.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use crate::core::{Config, ward::Ward};
use crate::events::{Bus, Event, EventKind};
use crate::flow::Signal;
use crate::heartbeat::{Heartbeat, Pacemaker, PulseEmitter, heartbeat, instant_after};
use crate::policies::BackoffPolicy;
use crate::wards::{Monitored, MonitoredRef};

/// Lifecycle of a steward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StewardState {
    /// A ward generation is being started.
    Starting,
    /// Watching the current ward's heartbeat.
    Monitoring,
    /// The current ward missed its deadline and is being replaced.
    Restarting,
    /// Terminal: the parent signal fired.
    Stopped,
}

/// Supervises a [`Monitored`] stage through its heartbeat.
///
/// Cheap to clone; every started run is independent.
///
/// # Example
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use std::time::Duration;
/// use stagevisor::{MonitoredFn, Pacemaker, Signal, Steward, heartbeat};
///
/// let ward = MonitoredFn::arc("idler", |signal: Signal, interval: Duration| {
///     let (pulses, beats) = heartbeat();
///     tokio::spawn(async move { Pacemaker::new(pulses, interval).idle(&signal).await });
///     beats
/// });
///
/// let signal = Signal::new();
/// let mut beats = Steward::new(Duration::from_millis(200), ward)
///     .start_with(&signal, Duration::from_millis(20));
///
/// assert!(beats.recv().await.is_some());
/// signal.cancel();
/// while beats.recv().await.is_some() {}
/// # }
/// ```
#[derive(Clone)]
pub struct Steward {
    name: Arc<str>,
    ward: MonitoredRef,
    timeout: Duration,
    ward_pulse_interval: Duration,
    backoff: BackoffPolicy,
    bus: Option<Bus>,
}

impl Steward {
    /// Creates a steward replacing `ward` after `timeout` of silence.
    ///
    /// The ward is asked to pulse every `timeout / 2`; restarts are immediate.
    pub fn new(timeout: Duration, ward: MonitoredRef) -> Self {
        let cfg = Config {
            timeout,
            ..Config::default()
        };
        Self::with_config(&cfg, ward)
    }

    /// Creates a steward from the timing and backoff fields of `cfg`.
    pub fn with_config(cfg: &Config, ward: MonitoredRef) -> Self {
        let name: Arc<str> = format!("steward({})", ward.name()).into();
        Self {
            name,
            ward,
            timeout: cfg.timeout,
            ward_pulse_interval: cfg.ward_pulse_interval(),
            backoff: cfg.backoff,
            bus: None,
        }
    }

    /// Renames the steward (used in events and logs).
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Replaces the restart backoff.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Publishes lifecycle events on `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Steward name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ward deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Spawns the monitoring loop under `parent`; returns the steward's heartbeat.
    ///
    /// The steward pulses every `pulse_interval` until `parent` fires, then
    /// closes the heartbeat.
    pub fn start_with(&self, parent: &Signal, pulse_interval: Duration) -> Heartbeat {
        let (pulses, beats) = heartbeat();
        tokio::spawn(self.clone().run(parent.clone(), pulse_interval, pulses));
        beats
    }

    /// Runs the state machine to completion.
    pub(crate) async fn run(self, parent: Signal, pulse_interval: Duration, pulses: PulseEmitter) {
        let mut pacemaker = Pacemaker::new(pulses, pulse_interval);
        let mut current: Option<Ward> = None;
        let mut generation = 0u64;
        let mut misses = 0u32;
        let mut state = StewardState::Starting;

        self.publish(Event::new(EventKind::StewardStarted));
        tracing::debug!(steward = %self.name, timeout = ?self.timeout, "steward started");

        loop {
            state = match state {
                StewardState::Starting if parent.is_cancelled() => StewardState::Stopped,
                StewardState::Starting => {
                    generation += 1;
                    self.publish(Event::new(EventKind::WardStarting).with_generation(generation));
                    tracing::debug!(steward = %self.name, generation, "starting ward");
                    current = Some(Ward::start(
                        self.ward.as_ref(),
                        &parent,
                        self.ward_pulse_interval,
                        generation,
                    ));
                    StewardState::Monitoring
                }
                StewardState::Monitoring => match current.as_mut() {
                    Some(ward) => self.monitor(&parent, ward, &mut pacemaker, &mut misses).await,
                    None => StewardState::Starting,
                },
                StewardState::Restarting => {
                    if let Some(ward) = current.take() {
                        self.retire(ward);
                    }
                    let delay = self.backoff.delay(misses);
                    misses = misses.saturating_add(1);
                    if delay.is_zero() {
                        StewardState::Starting
                    } else {
                        self.publish(
                            Event::new(EventKind::RestartScheduled)
                                .with_generation(generation)
                                .with_delay(delay),
                        );
                        tracing::debug!(steward = %self.name, delay = ?delay, "restart delayed");
                        if self.hold_off(&parent, &mut pacemaker, delay).await {
                            StewardState::Starting
                        } else {
                            StewardState::Stopped
                        }
                    }
                }
                StewardState::Stopped => break,
            };
        }

        drop(current);
        drop(pacemaker);
        self.publish(Event::new(EventKind::StewardStopped).with_generation(generation));
        tracing::debug!(steward = %self.name, generation, "steward stopped");
    }

    /// One monitoring cycle; returns the next state.
    async fn monitor(
        &self,
        parent: &Signal,
        ward: &mut Ward,
        pacemaker: &mut Pacemaker,
        misses: &mut u32,
    ) -> StewardState {
        let deadline = time::sleep(self.timeout);
        tokio::pin!(deadline);
        let mut listening = true;

        loop {
            tokio::select! {
                biased;
                _ = parent.cancelled() => return StewardState::Stopped,
                beat = ward.heartbeat.recv(), if listening => match beat {
                    Some(_) => {
                        deadline.as_mut().reset(instant_after(self.timeout));
                        if !ward.healthy {
                            ward.healthy = true;
                            *misses = 0;
                            self.publish(
                                Event::new(EventKind::WardHealthy).with_generation(ward.generation),
                            );
                        }
                    }
                    None => {
                        listening = false;
                        tracing::debug!(
                            steward = %self.name,
                            generation = ward.generation,
                            "ward heartbeat closed"
                        );
                    }
                },
                _ = pacemaker.tick() => {
                    pacemaker.pulse();
                }
                _ = &mut deadline => return StewardState::Restarting,
            }
        }
    }

    /// Tears down an unhealthy ward.
    fn retire(&self, ward: Ward) {
        self.publish(
            Event::new(EventKind::WardUnhealthy)
                .with_generation(ward.generation)
                .with_timeout(self.timeout),
        );
        tracing::warn!(
            steward = %self.name,
            generation = ward.generation,
            timeout = ?self.timeout,
            "ward unhealthy; restarting"
        );
        drop(ward);
    }

    /// Waits out a restart delay while still pulsing. Returns `false` if the
    /// parent fired first.
    async fn hold_off(&self, parent: &Signal, pacemaker: &mut Pacemaker, delay: Duration) -> bool {
        let pause = time::sleep(delay);
        tokio::pin!(pause);
        loop {
            tokio::select! {
                biased;
                _ = parent.cancelled() => return false,
                _ = &mut pause => return true,
                _ = pacemaker.tick() => {
                    pacemaker.pulse();
                }
            }
        }
    }

    fn publish(&self, ev: Event) {
        if let Some(bus) = &self.bus {
            bus.publish(ev.with_steward(Arc::clone(&self.name)));
        }
    }
}

impl Monitored for Steward {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, signal: Signal, pulse_interval: Duration) -> Heartbeat {
        self.start_with(&signal, pulse_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{Emitter, Stream, take};
    use crate::heartbeat::{Liveness, first_beat, next_beat};
    use crate::wards::{MonitoredFn, bridged};
    use std::sync::atomic::{AtomicU64, Ordering};

    const TIMEOUT: Duration = Duration::from_secs(1);

    /// Ward that never pulses; counts its starts.
    fn mute(starts: Arc<AtomicU64>) -> MonitoredRef {
        MonitoredFn::arc("mute", move |signal: Signal, _interval: Duration| {
            starts.fetch_add(1, Ordering::SeqCst);
            let (pulses, beats) = heartbeat();
            tokio::spawn(async move {
                signal.cancelled().await;
                drop(pulses);
            });
            beats
        })
    }

    /// Ward whose first generation is silent; later ones pulse.
    fn flaky(starts: Arc<AtomicU64>) -> MonitoredRef {
        MonitoredFn::arc("flaky", move |signal: Signal, interval: Duration| {
            let generation = starts.fetch_add(1, Ordering::SeqCst) + 1;
            let (pulses, beats) = heartbeat();
            tokio::spawn(async move {
                if generation == 1 {
                    signal.cancelled().await;
                } else {
                    Pacemaker::new(pulses, interval).idle(&signal).await;
                }
            });
            beats
        })
    }

    fn drain(mut events: tokio::sync::broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        while let Ok(ev) = events.try_recv() {
            kinds.push(ev.kind);
        }
        kinds
    }

    #[tokio::test(start_paused = true)]
    async fn silent_ward_restarts_once_per_window() {
        let starts = Arc::new(AtomicU64::new(0));
        let signal = Signal::new();
        let _beats = Steward::new(TIMEOUT, mute(starts.clone()))
            .start_with(&signal, Duration::from_millis(100));

        time::sleep(TIMEOUT * 7 / 2).await;
        // initial generation + one replacement per elapsed window
        assert_eq!(starts.load(Ordering::SeqCst), 4);
        signal.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn replacement_pulses_before_second_window() {
        let starts = Arc::new(AtomicU64::new(0));
        let signal = Signal::new();
        let bus = Bus::new(64);
        let events = bus.subscribe();
        let _beats = Steward::new(TIMEOUT, flaky(starts.clone()))
            .with_bus(bus)
            .start_with(&signal, Duration::from_millis(100));

        time::sleep(TIMEOUT * 3 / 2).await;
        assert_eq!(starts.load(Ordering::SeqCst), 2);

        time::sleep(TIMEOUT * 3).await;
        assert_eq!(starts.load(Ordering::SeqCst), 2, "healthy ward was replaced");

        let kinds = drain(events);
        assert_eq!(
            kinds,
            vec![
                EventKind::StewardStarted,
                EventKind::WardStarting,
                EventKind::WardUnhealthy,
                EventKind::WardStarting,
                EventKind::WardHealthy,
            ]
        );
        signal.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn steward_pulses_while_ward_is_silent() {
        let signal = Signal::new();
        let mut beats = Steward::new(TIMEOUT, mute(Arc::new(AtomicU64::new(0))))
            .start_with(&signal, Duration::from_millis(100));

        assert!(matches!(first_beat(&mut beats, &signal).await, Liveness::Alive(_)));
        for _ in 0..20 {
            let verdict = next_beat(&mut beats, &signal, Duration::from_millis(150)).await;
            assert!(matches!(verdict, Liveness::Alive(_)), "got {verdict:?}");
        }
        signal.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancel_stops_and_closes_heartbeat() {
        let starts = Arc::new(AtomicU64::new(0));
        let signal = Signal::new();
        let bus = Bus::new(64);
        let mut events = bus.subscribe();
        let mut beats = Steward::new(TIMEOUT, flaky(starts.clone()))
            .with_name("worker")
            .with_bus(bus)
            .start_with(&signal, Duration::from_millis(100));

        time::sleep(Duration::from_millis(250)).await;
        signal.cancel();
        while beats.recv().await.is_some() {}

        let mut last = None;
        while let Ok(ev) = events.recv().await {
            let stopped = ev.kind == EventKind::StewardStopped;
            last = Some(ev);
            if stopped {
                break;
            }
        }
        let last = last.expect("events");
        assert_eq!(last.kind, EventKind::StewardStopped);
        assert_eq!(last.steward.as_deref(), Some("worker"));
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_delays_replacement_and_keeps_pulsing() {
        let starts = Arc::new(AtomicU64::new(0));
        let signal = Signal::new();
        let bus = Bus::new(64);
        let mut events = bus.subscribe();
        let mut beats = Steward::new(TIMEOUT, mute(starts.clone()))
            .with_backoff(BackoffPolicy::exponential(
                Duration::from_secs(2),
                Duration::from_secs(8),
            ))
            .with_bus(bus)
            .start_with(&signal, Duration::from_millis(100));

        // first window misses at 1s, replacement waits until 3s
        time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert!(matches!(
            next_beat(&mut beats, &signal, Duration::from_millis(150)).await,
            Liveness::Alive(_)
        ));

        time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(starts.load(Ordering::SeqCst), 2);

        let scheduled = loop {
            let ev = events.recv().await.expect("event");
            if ev.kind == EventKind::RestartScheduled {
                break ev;
            }
        };
        assert_eq!(scheduled.delay_ms, Some(2000));
        assert_eq!(scheduled.generation, Some(1));
        signal.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_timeout_never_restarts() {
        let starts = Arc::new(AtomicU64::new(0));
        let counter = starts.clone();
        let chatty = MonitoredFn::arc("chatty", move |signal: Signal, _interval: Duration| {
            counter.fetch_add(1, Ordering::SeqCst);
            let (pulses, beats) = heartbeat();
            tokio::spawn(async move {
                Pacemaker::new(pulses, Duration::from_millis(10)).idle(&signal).await;
            });
            beats
        });

        let signal = Signal::new();
        let mut beats =
            Steward::new(Duration::MAX, chatty).start_with(&signal, Duration::from_millis(100));

        time::sleep(Duration::from_secs(60)).await;
        assert!(matches!(
            next_beat(&mut beats, &signal, Duration::from_millis(150)).await,
            Liveness::Alive(_)
        ));
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        signal.cancel();
        while beats.recv().await.is_some() {}
    }

    #[tokio::test(start_paused = true)]
    async fn closed_ward_heartbeat_is_replaced_after_deadline() {
        let starts = Arc::new(AtomicU64::new(0));
        let counter = starts.clone();
        let quitter = MonitoredFn::arc("quitter", move |_signal: Signal, _interval: Duration| {
            counter.fetch_add(1, Ordering::SeqCst);
            heartbeat().1
        });

        let signal = Signal::new();
        let _beats = Steward::new(TIMEOUT, quitter).start_with(&signal, Duration::from_millis(100));

        time::sleep(Duration::from_millis(900)).await;
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(starts.load(Ordering::SeqCst), 2);
        signal.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn steward_can_supervise_a_steward() {
        let inner_starts = Arc::new(AtomicU64::new(0));
        let inner = Steward::new(TIMEOUT, flaky(inner_starts.clone())).with_name("inner");
        let outer = Steward::new(Duration::from_secs(4), Arc::new(inner)).with_name("outer");

        let signal = Signal::new();
        let bus = Bus::new(64);
        let mut events = bus.subscribe();
        let mut beats = outer.with_bus(bus).start_with(&signal, Duration::from_millis(100));

        // the inner steward keeps pulsing through its own restart
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(inner_starts.load(Ordering::SeqCst), 2);
        assert!(matches!(
            next_beat(&mut beats, &signal, Duration::from_millis(150)).await,
            Liveness::Alive(_)
        ));

        signal.cancel();
        while beats.recv().await.is_some() {}
        let mut unhealthy = 0;
        while let Ok(ev) = events.try_recv() {
            if ev.kind == EventKind::WardUnhealthy {
                unhealthy += 1;
            }
        }
        assert_eq!(unhealthy, 0, "outer steward must not restart a pulsing inner steward");
    }

    #[tokio::test(start_paused = true)]
    async fn bridged_output_survives_a_restart() {
        let signal = Signal::new();
        let starts = Arc::new(AtomicU64::new(0));
        let counter = starts.clone();

        // generation 1 emits 1, 2 then hangs silently; later generations count from 10.
        let (ward, numbers): (MonitoredRef, Stream<u64>) = bridged(
            &signal,
            "counter",
            move |stage: Signal, interval: Duration, out: Emitter<u64>| {
                let generation = counter.fetch_add(1, Ordering::SeqCst) + 1;
                let (pulses, beats) = heartbeat();
                tokio::spawn(async move {
                    if generation == 1 {
                        for n in [1, 2] {
                            if out.send(&stage, n).await.is_err() {
                                return;
                            }
                        }
                        stage.cancelled().await;
                        drop(pulses);
                        return;
                    }
                    let mut pacemaker = Pacemaker::new(pulses, interval);
                    for n in 10.. {
                        if pacemaker.send_with_pulse(&stage, &out, n).await.is_err() {
                            return;
                        }
                    }
                });
                beats
            },
        );

        let _beats = Steward::new(TIMEOUT, ward).start_with(&signal, Duration::from_millis(100));
        let got = take(&signal, numbers, 5).into_vec().await;
        assert_eq!(got, vec![1, 2, 10, 11, 12]);
        assert_eq!(starts.load(Ordering::SeqCst), 2);
        signal.cancel();
    }
}
