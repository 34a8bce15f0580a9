//! Liveness pulses, decoupled from payload throughput.
//!
//! A long-running stage may be blocked for a long time waiting for downstream
//! capacity. It is still alive, so it keeps pulsing while it waits:
//!
//! ```text
//!   stage loop: select! {
//!       signal.cancelled()   → exit (closes output and heartbeat)
//!       pacemaker.tick()     → try_send(Pulse)     (dropped if nobody is listening)
//!       out.send(value)      → next value
//!   }
//! ```
//!
//! ## Rules
//! - Pulses are **best-effort**: a pulse sent while no monitor is waiting is dropped,
//!   never queued behind payload and never read later as current liveness. Sending
//!   one never blocks the stage.
//! - The **first pulse** is a synchronization point: a monitor waits for it before
//!   judging liveness so that start-up latency is not mistaken for a stall.
//! - A heartbeat stream closes when its stage exits (its [`PulseEmitter`] is dropped).

mod monitor;
mod pacemaker;
mod pulse;
mod sources;

pub use monitor::{Liveness, first_beat, next_beat};
pub use pacemaker::Pacemaker;
pub use pulse::{Heartbeat, Pulse, PulseEmitter, heartbeat};
pub use sources::{pulse_per_item, pulsing_generator};

use std::time::Duration;

use tokio::time::Instant;

/// Stand-in for "never", roughly 30 years out.
pub(crate) const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + after`, saturating at [`FAR_FUTURE`].
pub(crate) fn instant_after(after: Duration) -> Instant {
    Instant::now() + after.min(FAR_FUTURE)
}
