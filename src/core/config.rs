//! # Runtime and steward configuration.
//!
//! [`Config`] holds the knobs a [`Runtime`](crate::Runtime) hands to every
//! steward it creates: the ward deadline, the ward pulse interval, restart
//! backoff, plus runtime-wide shutdown grace and event bus capacity.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use stagevisor::{BackoffPolicy, Config};
//!
//! let mut cfg = Config::default();
//! cfg.timeout = Duration::from_millis(400);
//! cfg.backoff = BackoffPolicy::exponential(Duration::from_millis(50), Duration::from_secs(2));
//!
//! // Unset pulse interval follows the deadline.
//! assert_eq!(cfg.ward_pulse_interval(), Duration::from_millis(200));
//! ```

use std::time::Duration;

use crate::policies::BackoffPolicy;

/// Smallest pulse interval handed to a ward.
const MIN_PULSE_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration shared by the runtime and its stewards.
#[derive(Clone, Debug)]
pub struct Config {
    /// How long a ward may stay silent before it is replaced.
    pub timeout: Duration,
    /// Pulse interval requested from wards (`0` = `timeout / 2`).
    pub pulse_interval: Duration,
    /// Maximum time to wait for stewards to stop on shutdown.
    pub grace: Duration,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
    /// Delay policy between ward generations.
    pub backoff: BackoffPolicy,
}

impl Default for Config {
    /// - `timeout = 1s`
    /// - `pulse_interval = 0` (half the timeout)
    /// - `grace = 60s`
    /// - `bus_capacity = 1024`
    /// - `backoff = BackoffPolicy::immediate()`
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            pulse_interval: Duration::ZERO,
            grace: Duration::from_secs(60),
            bus_capacity: 1024,
            backoff: BackoffPolicy::immediate(),
        }
    }
}

impl Config {
    /// Effective ward pulse interval (min 1ms).
    pub fn ward_pulse_interval(&self) -> Duration {
        let interval = if self.pulse_interval.is_zero() {
            self.timeout / 2
        } else {
            self.pulse_interval
        };
        interval.max(MIN_PULSE_INTERVAL)
    }

    /// Bus capacity, at least 1.
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}
