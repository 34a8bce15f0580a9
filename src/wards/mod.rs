//! # Supervisable stages.
//!
//! - [`Monitored`] - trait for stages a [`Steward`](crate::Steward) can start and restart
//! - [`MonitoredFn`] - closure-backed implementation
//! - [`MonitoredRef`] - shared handle (`Arc<dyn Monitored>`)
//! - [`bridged`] - monitored stage whose output survives restarts

mod bridged;
mod monitored;
mod monitored_fn;

pub use bridged::bridged;
pub use monitored::{Monitored, MonitoredRef};
pub use monitored_fn::MonitoredFn;
