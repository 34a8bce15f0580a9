//! Supervision core: stewards, their wards, and the runtime that owns them.
//!
//! - [`steward`]: the `Starting → Monitoring ⇄ Restarting → Stopped` loop;
//! - [`ward`]: one started generation and its private stop signal;
//! - [`runtime`] / [`builder`]: root signal, event wiring, graceful shutdown;
//! - [`alive`]: which stewards are still running;
//! - [`shutdown`]: OS termination signals.

mod alive;
mod builder;
mod config;
mod runtime;
mod shutdown;
mod steward;
mod ward;

pub use builder::RuntimeBuilder;
pub use config::Config;
pub use runtime::Runtime;
pub use steward::Steward;
