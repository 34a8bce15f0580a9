//! # Runtime: owns the root signal and every steward started through it.
//!
//! ```text
//! RuntimeBuilder::build()
//!   ├─ Bus::new(cfg.bus_capacity)
//!   ├─ SubscriberSet (one worker per subscriber)
//!   └─ listener: Bus ──► AliveTracker::update ──► SubscriberSet::emit_arc
//!
//! Runtime::supervise(steward)
//!   └─ TaskTracker::spawn(steward.run(root signal))
//!
//! Runtime::run_until_shutdown()
//!   ├─ wait: root signal fired | SIGINT/SIGTERM/SIGQUIT
//!   ├─ publish ShutdownRequested, cancel root signal
//!   └─ wait for every steward, bounded by cfg.grace:
//!        ├─ all stopped → AllStoppedWithin, Ok(())
//!        └─ timeout     → GraceExceeded, Err(RuntimeError::GraceExceeded { stuck })
//! ```
//!
//! # Example
//! ```no_run
//! use std::time::Duration;
//! use stagevisor::{Config, MonitoredFn, Pacemaker, Runtime, Signal, heartbeat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), stagevisor::RuntimeError> {
//!     let rt = Runtime::builder(Config::default()).build();
//!
//!     let ward = MonitoredFn::arc("idler", |signal: Signal, interval: Duration| {
//!         let (pulses, beats) = heartbeat();
//!         tokio::spawn(async move { Pacemaker::new(pulses, interval).idle(&signal).await });
//!         beats
//!     });
//!     let _beats = rt.supervise(rt.steward(ward), Duration::from_secs(1));
//!
//!     rt.run_until_shutdown().await
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::task::TaskTracker;

use crate::core::{Config, RuntimeBuilder, Steward, alive::AliveTracker, shutdown};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::flow::Signal;
use crate::heartbeat::{Heartbeat, heartbeat};
use crate::subscribers::SubscriberSet;
use crate::wards::MonitoredRef;

/// Owner of the root signal, the event bus and all supervised stewards.
pub struct Runtime {
    cfg: Config,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    alive: Arc<AliveTracker>,
    signal: Signal,
    stewards: TaskTracker,
}

impl Runtime {
    /// Starts building a runtime.
    pub fn builder(cfg: Config) -> RuntimeBuilder {
        RuntimeBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: Config, bus: Bus, subs: Arc<SubscriberSet>) -> Self {
        let rt = Self {
            cfg,
            bus,
            subs,
            alive: Arc::new(AliveTracker::new()),
            signal: Signal::new(),
            stewards: TaskTracker::new(),
        };
        rt.spawn_listener();
        rt
    }

    /// Root signal; every supervised steward stops when it fires.
    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    /// Event bus shared with the stewards.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Runtime configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Creates a steward for `ward` configured from this runtime.
    pub fn steward(&self, ward: MonitoredRef) -> Steward {
        Steward::with_config(&self.cfg, ward).with_bus(self.bus.clone())
    }

    /// Runs `steward` under the root signal; returns its heartbeat.
    ///
    /// The steward is tracked for shutdown and publishes on this runtime's bus.
    pub fn supervise(&self, steward: Steward, pulse_interval: Duration) -> Heartbeat {
        let (pulses, beats) = heartbeat();
        let steward = steward.with_bus(self.bus.clone());
        self.stewards
            .spawn(steward.run(self.signal.clone(), pulse_interval, pulses));
        beats
    }

    /// Names of stewards currently alive (eventually consistent).
    pub async fn alive(&self) -> Vec<String> {
        self.alive.snapshot().await
    }

    /// Fires the root signal.
    pub fn shutdown(&self) {
        self.signal.cancel();
    }

    /// Waits for a termination signal (or the root signal), then stops every
    /// steward within [`Config::grace`].
    pub async fn run_until_shutdown(&self) -> Result<(), RuntimeError> {
        let os = async {
            if let Err(error) = shutdown::termination().await {
                tracing::warn!(%error, "os signal handlers unavailable; waiting for shutdown()");
                std::future::pending::<()>().await;
            }
        };
        tokio::select! {
            biased;
            _ = self.signal.cancelled() => {}
            _ = os => {}
        }

        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        tracing::info!(grace = ?self.cfg.grace, "shutdown requested");
        self.signal.cancel();
        self.wait_all_with_grace().await
    }

    async fn wait_all_with_grace(&self) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        self.stewards.close();

        match tokio::time::timeout(grace, self.stewards.wait()).await {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                self.bus.publish(Event::new(EventKind::GraceExceeded));
                let stuck = self.alive.snapshot().await;
                tracing::error!(grace = ?grace, ?stuck, "stewards did not stop in time");
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }

    /// Forwards bus events to the alive tracker and the subscribers.
    fn spawn_listener(&self) {
        let mut rx = self.bus.subscribe();
        let subs = Arc::clone(&self.subs);
        let alive = Arc::clone(&self.alive);

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        alive.update(&ev).await;
                        subs.emit_arc(Arc::new(ev));
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heartbeat::Pacemaker;
    use crate::subscribers::Subscribe;
    use crate::wards::MonitoredFn;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time;

    #[derive(Default)]
    struct Recorder {
        kinds: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.kinds.lock().expect("lock").push(ev.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    fn idler(name: &'static str) -> MonitoredRef {
        MonitoredFn::arc(name, |signal: Signal, interval: Duration| {
            let (pulses, beats) = heartbeat();
            tokio::spawn(async move { Pacemaker::new(pulses, interval).idle(&signal).await });
            beats
        })
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_every_steward_within_grace() {
        let recorder = Arc::new(Recorder::default());
        let rt = Runtime::builder(Config::default())
            .subscriber(recorder.clone())
            .build();

        let mut a = rt.supervise(rt.steward(idler("a")), Duration::from_millis(100));
        let mut b = rt.supervise(rt.steward(idler("b")), Duration::from_millis(100));
        time::sleep(Duration::from_millis(300)).await;
        assert_eq!(rt.alive().await, vec!["steward(a)", "steward(b)"]);

        rt.shutdown();
        rt.run_until_shutdown().await.expect("clean shutdown");
        while a.recv().await.is_some() {}
        while b.recv().await.is_some() {}

        time::sleep(Duration::from_millis(10)).await;
        assert!(rt.alive().await.is_empty());
        let kinds = recorder.kinds.lock().expect("lock").clone();
        assert!(kinds.contains(&EventKind::ShutdownRequested));
        assert_eq!(kinds.last(), Some(&EventKind::AllStoppedWithin));
        assert_eq!(
            kinds.iter().filter(|k| **k == EventKind::StewardStopped).count(),
            2
        );
    }

    #[tokio::test(start_paused = true)]
    async fn runtime_steward_uses_config() {
        let cfg = Config {
            timeout: Duration::from_millis(300),
            ..Config::default()
        };
        let rt = Runtime::builder(cfg).build();
        let steward = rt.steward(idler("cfg")).with_name("custom");
        assert_eq!(steward.name(), "custom");
        assert_eq!(steward.timeout(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn supervised_stewards_pulse_until_root_fires() {
        let rt = Runtime::builder(Config::default()).build();
        let mut beats = rt.supervise(rt.steward(idler("p")), Duration::from_millis(50));
        for _ in 0..5 {
            assert!(beats.recv().await.is_some());
        }
        rt.signal().cancel();
        while beats.recv().await.is_some() {}
        rt.run_until_shutdown().await.expect("already stopped");
    }
}
