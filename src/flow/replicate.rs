//! Replicated requests: run the same job several times, keep the fastest answer.

use std::future::Future;

use tokio::task::JoinSet;

use crate::flow::Signal;

/// Starts `replicas` copies of `work` and returns the first answer with the
/// index of the replica that produced it.
///
/// Every replica receives a child of `signal`; it is cancelled as soon as a
/// winner is known, and `first_of` waits for the losers to wind down before
/// returning. Returns `None` when `replicas == 0`, when `signal` fires first,
/// or when every replica finished without an answer.
///
/// # Example
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use std::time::Duration;
/// use stagevisor::flow::{first_of, Signal};
///
/// let winner = first_of(&Signal::new(), 3, |id, done| async move {
///     let delay = Duration::from_millis(10 * (3 - id as u64));
///     tokio::select! {
///         _ = tokio::time::sleep(delay) => Some(id),
///         _ = done.cancelled() => None,
///     }
/// })
/// .await;
/// assert_eq!(winner, Some((2, 2)));
/// # }
/// ```
pub async fn first_of<T, F, Fut>(signal: &Signal, replicas: usize, work: F) -> Option<(usize, T)>
where
    T: Send + 'static,
    F: Fn(usize, Signal) -> Fut,
    Fut: Future<Output = Option<T>> + Send + 'static,
{
    let done = signal.child();
    let mut set = JoinSet::new();
    for id in 0..replicas {
        let fut = work(id, done.clone());
        set.spawn(async move { fut.await.map(|v| (id, v)) });
    }

    let mut winner = None;
    while winner.is_none() {
        let joined = tokio::select! {
            biased;
            _ = done.cancelled() => break,
            joined = set.join_next() => joined,
        };
        match joined {
            Some(Ok(answer)) => winner = answer,
            Some(Err(e)) => tracing::warn!(error = %e, "replica panicked or was aborted"),
            None => break,
        }
    }

    done.cancel();
    while set.join_next().await.is_some() {}
    winner
}
