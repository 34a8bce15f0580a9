//! One generation of a supervised stage, as seen from its steward.

use std::time::Duration;

use crate::flow::Signal;
use crate::heartbeat::Heartbeat;
use crate::wards::Monitored;

/// A running ward: its private stop signal plus the heartbeat it reports on.
///
/// Dropping the ward cancels its signal, which tears the stage down.
pub(crate) struct Ward {
    own: Signal,
    pub(crate) heartbeat: Heartbeat,
    pub(crate) generation: u64,
    pub(crate) healthy: bool,
}

impl Ward {
    /// Starts `target` under `own | parent`.
    pub(crate) fn start(
        target: &dyn Monitored,
        parent: &Signal,
        pulse_interval: Duration,
        generation: u64,
    ) -> Self {
        let own = Signal::new();
        let stage = Signal::any_of([own.clone(), parent.clone()]);
        let heartbeat = target.start(stage, pulse_interval);
        Self {
            own,
            heartbeat,
            generation,
            healthy: false,
        }
    }
}

impl Drop for Ward {
    fn drop(&mut self) {
        self.own.cancel();
    }
}
