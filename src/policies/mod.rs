//! Restart pacing for stewards.
//!
//! ## Contents
//! - [`BackoffPolicy`] delay before a replacement ward is started
//! - [`JitterPolicy`] randomization applied on top of the backoff delay
//!
//! ## Wiring
//! ```text
//! Steward { backoff: BackoffPolicy }
//!      └─► Restarting: delay = backoff.delay(misses)
//!           misses = consecutive deadlines missed without a healthy pulse
//! ```
//!
//! The default is [`BackoffPolicy::immediate`]: a replacement is started as soon
//! as the unhealthy ward has been torn down.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
