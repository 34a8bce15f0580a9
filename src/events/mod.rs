//! Supervision events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] classification and metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Steward` (ward lifecycle), `Runtime` (shutdown),
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the runtime listener, which updates the alive tracker and
//!   fans out to the `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
