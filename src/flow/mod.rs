//! Cancellable stream pipelines.
//!
//! Every combinator takes a [`Signal`] plus its input stream(s), spawns one
//! stage on the tokio runtime and returns the output stream(s) immediately.
//!
//! ## Contents
//! - [`Signal`] one-shot cancellation, [`Signal::any_of`] composite
//! - [`Stream`] / [`Emitter`] single-producer conduit, closed by drop
//! - sources: [`generator`], [`repeat`], [`repeat_fn`]
//! - stages: [`map`], [`filter`], [`try_map`], [`try_map_split`], [`take`], [`or_done`]
//! - topology: [`fan_out`], [`fan_out_map`], [`fan_in`], [`bridge`], [`tee`]
//! - [`first_of`] replicated work, first answer wins
//!
//! ## Example
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use stagevisor::flow::{self, Signal};
//!
//! let signal = Signal::new();
//! let nums = flow::generator(&signal, vec![1, 2, 3, 4]);
//! let out = flow::map(&signal, nums, |v| v * 2);
//! let out = flow::map(&signal, out, |v| v + 1);
//! let out = flow::map(&signal, out, |v| v * 2);
//! assert_eq!(out.into_vec().await, vec![6, 10, 14, 18]);
//! # }
//! ```
//!
//! ## Ordering
//! Per-source order is preserved through `map`/`filter`/`take`/`bridge`;
//! nothing is promised across sources in `fan_in`/`fan_out`/`tee`.

mod bridge;
mod fan;
mod generate;
mod replicate;
mod signal;
mod stage;
mod stream;
mod tee;

use std::future::Future;

pub use bridge::bridge;
pub use fan::{fan_in, fan_out, fan_out_map};
pub use generate::{generator, repeat, repeat_fn};
pub use replicate::first_of;
pub use signal::Signal;
pub use stage::{FailurePolicy, filter, map, or_done, take, try_map, try_map_split};
pub use stream::{DEFAULT_CAPACITY, Emitter, Stream, channel};
pub use tee::tee;

pub(crate) use stream::SharedStream;

use crate::error::StreamError;

/// Runs one stage body on the runtime.
///
/// The body owns its emitter(s), so the outputs close when it returns,
/// whatever the reason.
pub(crate) fn spawn_stage<F>(kind: &'static str, body: F)
where
    F: Future<Output = Result<(), StreamError>> + Send + 'static,
{
    tokio::spawn(async move {
        match body.await {
            Ok(()) => tracing::trace!(stage = kind, "stage finished"),
            Err(e) => tracing::trace!(stage = kind, reason = e.as_label(), "stage stopped"),
        }
    });
}
