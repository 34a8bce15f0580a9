//! Consumer-side liveness checks.

use std::time::Duration;

use tokio::time;

use crate::flow::Signal;
use crate::heartbeat::{Heartbeat, Pulse};

/// Verdict of waiting on a heartbeat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Liveness {
    /// A pulse arrived in time.
    Alive(Pulse),
    /// No pulse within the window.
    Stalled,
    /// The heartbeat closed: the stage exited.
    Closed,
    /// The monitor's own signal fired.
    Cancelled,
}

/// Waits, without a deadline, for the synchronization pulse.
///
/// Call this once before the first [`next_beat`]: it absorbs start-up latency.
pub async fn first_beat(heartbeat: &mut Heartbeat, signal: &Signal) -> Liveness {
    tokio::select! {
        biased;
        _ = signal.cancelled() => Liveness::Cancelled,
        beat = heartbeat.recv() => beat.map_or(Liveness::Closed, Liveness::Alive),
    }
}

/// Waits for the next pulse for at most `within`.
pub async fn next_beat(heartbeat: &mut Heartbeat, signal: &Signal, within: Duration) -> Liveness {
    tokio::select! {
        biased;
        _ = signal.cancelled() => Liveness::Cancelled,
        beat = heartbeat.recv() => beat.map_or(Liveness::Closed, Liveness::Alive),
        _ = time::sleep(within) => Liveness::Stalled,
    }
}
