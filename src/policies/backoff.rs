//! # Backoff between ward generations.
//!
//! A steward replaces an unhealthy ward immediately unless configured with a
//! growing delay. The delay for the `n`-th consecutive miss (0-based) is
//! `first × factor^n`, capped at `max`, then jittered. A healthy pulse from a
//! ward resets `n` to zero.
//!
//! ```rust
//! use std::time::Duration;
//! use stagevisor::BackoffPolicy;
//!
//! let b = BackoffPolicy::exponential(Duration::from_millis(100), Duration::from_secs(1));
//! assert_eq!(b.delay(0), Duration::from_millis(100));
//! assert_eq!(b.delay(2), Duration::from_millis(400));
//! assert_eq!(b.delay(9), Duration::from_secs(1));
//!
//! assert_eq!(BackoffPolicy::immediate().delay(42), Duration::ZERO);
//! ```

use std::time::Duration;

use super::jitter::JitterPolicy;

/// Restart delay policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first miss.
    pub first: Duration,
    /// Upper bound before jitter.
    pub max: Duration,
    /// Growth per consecutive miss.
    pub factor: f64,
    /// Randomization of the capped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::immediate()
    }
}

impl BackoffPolicy {
    /// No delay: the replacement starts right after teardown.
    pub const fn immediate() -> Self {
        Self {
            first: Duration::ZERO,
            max: Duration::ZERO,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Doubling delay starting at `first`, capped at `max`.
    pub const fn exponential(first: Duration, max: Duration) -> Self {
        Self {
            first,
            max,
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Replaces the jitter policy.
    pub const fn with_jitter(mut self, jitter: JitterPolicy) -> Self {
        self.jitter = jitter;
        self
    }

    /// Returns `true` if every delay is zero.
    pub fn is_immediate(&self) -> bool {
        self.first.is_zero() || self.max.is_zero()
    }

    /// Delay before the replacement after `misses` earlier consecutive misses.
    pub fn delay(&self, misses: u32) -> Duration {
        if self.is_immediate() {
            return Duration::ZERO;
        }
        let exp = misses.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);
        let base = if secs.is_finite() && secs >= 0.0 && secs <= self.max.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.max
        };
        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_immediate() {
        let b = BackoffPolicy::default();
        assert!(b.is_immediate());
        for n in [0, 1, 7, u32::MAX] {
            assert_eq!(b.delay(n), Duration::ZERO);
        }
    }

    #[test]
    fn first_larger_than_max_is_capped() {
        let b = BackoffPolicy::exponential(Duration::from_secs(10), Duration::from_secs(2));
        assert_eq!(b.delay(0), Duration::from_secs(2));
    }

    #[test]
    fn constant_factor_keeps_first() {
        let b = BackoffPolicy {
            factor: 1.0,
            ..BackoffPolicy::exponential(Duration::from_millis(250), Duration::from_secs(5))
        };
        assert_eq!(b.delay(0), Duration::from_millis(250));
        assert_eq!(b.delay(30), Duration::from_millis(250));
    }

    #[test]
    fn overflowing_growth_saturates_at_max() {
        let b = BackoffPolicy::exponential(Duration::from_millis(1), Duration::from_secs(3));
        assert_eq!(b.delay(u32::MAX), Duration::from_secs(3));
    }

    #[test]
    fn jitter_never_exceeds_cap() {
        let b = BackoffPolicy::exponential(Duration::from_millis(100), Duration::from_millis(800))
            .with_jitter(JitterPolicy::Full);
        for n in 0..20 {
            assert!(b.delay(n) <= Duration::from_millis(800));
        }
    }
}
