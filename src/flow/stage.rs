//! Transform stages: one input stream, one output stream.
//!
//! Each stage reads until its input closes or the signal fires, and closes its
//! output on exit. Upstream closure and cancellation both propagate downstream
//! as "end of stream".

use crate::error::{StageError, StreamError};
use crate::flow::{Emitter, Signal, Stream, channel, spawn_stage};

/// What a fallible stage does when its transform fails for one item.
///
/// `Fatal` and `Canceled` errors always stop the stage, whatever the policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Drop the failing item and keep going.
    #[default]
    Skip,
    /// Close the output early; the missing values are the error signal.
    Stop,
}

/// Applies `f` to every item.
pub fn map<T, U, F>(signal: &Signal, input: Stream<T>, mut f: F) -> Stream<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnMut(T) -> U + Send + 'static,
{
    let (out, stream) = channel();
    let signal = signal.clone();
    let mut input = input;
    spawn_stage("map", async move {
        while let Some(v) = input.recv_or_done(&signal).await {
            out.send(&signal, f(v)).await?;
        }
        Ok(())
    });
    stream
}

/// Forwards only the items matching `pred`.
pub fn filter<T, P>(signal: &Signal, input: Stream<T>, mut pred: P) -> Stream<T>
where
    T: Send + 'static,
    P: FnMut(&T) -> bool + Send + 'static,
{
    let (out, stream) = channel();
    let signal = signal.clone();
    let mut input = input;
    spawn_stage("filter", async move {
        while let Some(v) = input.recv_or_done(&signal).await {
            if pred(&v) {
                out.send(&signal, v).await?;
            }
        }
        Ok(())
    });
    stream
}

/// Applies a fallible `f`, handling failures per `policy`.
///
/// ### Rules
/// - `Ok(u)` is forwarded;
/// - `Err(Fail)` is skipped under [`FailurePolicy::Skip`], closes the output under
///   [`FailurePolicy::Stop`];
/// - `Err(Fatal | Canceled)` always closes the output.
pub fn try_map<T, U, F>(
    signal: &Signal,
    input: Stream<T>,
    policy: FailurePolicy,
    mut f: F,
) -> Stream<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnMut(T) -> Result<U, StageError> + Send + 'static,
{
    let (out, stream) = channel();
    let signal = signal.clone();
    let mut input = input;
    spawn_stage("try_map", async move {
        while let Some(v) = input.recv_or_done(&signal).await {
            match f(v) {
                Ok(u) => out.send(&signal, u).await?,
                Err(e) if e.is_retryable() && policy == FailurePolicy::Skip => {
                    tracing::debug!(reason = e.as_label(), error = %e, "item skipped");
                }
                Err(e) => {
                    tracing::debug!(reason = e.as_label(), error = %e, "stage closed early");
                    return Ok(());
                }
            }
        }
        Ok(())
    });
    stream
}

/// Applies a fallible `f`, reporting failures on a parallel error stream.
///
/// `Fail` errors are reported and the stage continues; `Fatal`/`Canceled`
/// are reported and the stage stops. If the error stream was dropped,
/// errors are discarded and the stage behaves as with [`FailurePolicy::Skip`].
pub fn try_map_split<T, U, F>(
    signal: &Signal,
    input: Stream<T>,
    mut f: F,
) -> (Stream<U>, Stream<StageError>)
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnMut(T) -> Result<U, StageError> + Send + 'static,
{
    let (out, values) = channel();
    let (err_out, errors) = channel();
    let signal = signal.clone();
    let mut input = input;
    spawn_stage("try_map_split", async move {
        while let Some(v) = input.recv_or_done(&signal).await {
            match f(v) {
                Ok(u) => out.send(&signal, u).await?,
                Err(e) => {
                    let stop = !e.is_retryable();
                    report(&signal, &err_out, e).await?;
                    if stop {
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    });
    (values, errors)
}

async fn report(
    signal: &Signal,
    errors: &Emitter<StageError>,
    err: StageError,
) -> Result<(), StreamError> {
    match errors.send(signal, err).await {
        Err(StreamError::Cancelled) => Err(StreamError::Cancelled),
        _ => Ok(()),
    }
}

/// Forwards the first `n` items, then closes.
///
/// Dropping the input on exit lets the upstream stage observe the disconnect
/// and stop as well.
pub fn take<T>(signal: &Signal, input: Stream<T>, n: usize) -> Stream<T>
where
    T: Send + 'static,
{
    let (out, stream) = channel();
    let signal = signal.clone();
    let mut input = input;
    spawn_stage("take", async move {
        for _ in 0..n {
            match input.recv_or_done(&signal).await {
                Some(v) => out.send(&signal, v).await?,
                None => break,
            }
        }
        Ok(())
    });
    stream
}

/// Wraps a plain stream so that both the receive and the forwarding send race
/// against `signal`.
///
/// A consumer can then loop over the result without a `select!` of its own.
pub fn or_done<T>(signal: &Signal, input: Stream<T>) -> Stream<T>
where
    T: Send + 'static,
{
    map(signal, input, |v| v)
}
