//! # One-shot broadcast cancellation.
//!
//! [`Signal`] wraps a [`CancellationToken`]: `Active → Cancelled` exactly once,
//! observable by every clone. Cancelling twice is a no-op.
//!
//! [`Signal::any_of`] derives a composite signal that fires as soon as any of
//! its sources fires. The sources are watched as one dynamic wait-set
//! (`select_all`), so there is no arity limit.
//!
//! ```text
//!   src #1 ──┐
//!   src #2 ──┼──► select_all ──► composite.cancel()
//!   src #N ──┘         ▲
//!                      └── watcher also exits if the composite is cancelled directly
//! ```

use futures::future;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Cooperative cancellation handle shared by every stage of a pipeline.
///
/// Cheap to clone; all clones observe the same state.
#[derive(Clone, Debug, Default)]
pub struct Signal {
    token: CancellationToken,
}

impl Signal {
    /// Creates a new, active signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the signal. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the signal has fired. Never blocks.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once the signal has fired (immediately if it already has).
    ///
    /// Meant to be used as one arm of a `tokio::select!`.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Derives a child signal: cancelled with `self`, but cancelling the child
    /// leaves `self` untouched.
    pub fn child(&self) -> Signal {
        Signal {
            token: self.token.child_token(),
        }
    }

    /// Returns the underlying token for interop with tokio-util based code.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Builds the "any-of" composite of `signals`.
    ///
    /// - no sources: a fresh signal that only fires when cancelled directly;
    /// - one source: that source, unchanged;
    /// - otherwise: a new signal plus one watcher task (requires a tokio runtime).
    ///
    /// Firing the composite never fires its sources.
    ///
    /// # Example
    /// ```
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// use stagevisor::Signal;
    ///
    /// let sources: Vec<Signal> = (0..8).map(|_| Signal::new()).collect();
    /// let any = Signal::any_of(sources.clone());
    ///
    /// sources[5].cancel();
    /// any.cancelled().await;
    /// assert!(!sources[0].is_cancelled());
    /// # }
    /// ```
    pub fn any_of<I>(signals: I) -> Signal
    where
        I: IntoIterator<Item = Signal>,
    {
        let signals: Vec<Signal> = signals.into_iter().collect();
        let signals = match <[Signal; 1]>::try_from(signals) {
            Ok([only]) => return only,
            Err(signals) => signals,
        };

        let composite = Signal::new();
        if signals.is_empty() {
            return composite;
        }
        if signals.iter().any(Signal::is_cancelled) {
            composite.cancel();
            return composite;
        }

        let waits = signals
            .into_iter()
            .map(|s| Box::pin(s.token.cancelled_owned()));
        let watcher = composite.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = future::select_all(waits) => watcher.cancel(),
                _ = watcher.cancelled() => {}
            }
        });
        composite
    }
}

impl From<CancellationToken> for Signal {
    fn from(token: CancellationToken) -> Self {
        Self { token }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn cancel_is_idempotent_and_shared() {
        let s = Signal::new();
        let c = s.clone();
        assert!(!c.is_cancelled());
        s.cancel();
        s.cancel();
        assert!(c.is_cancelled());
    }

    #[test]
    fn child_does_not_cancel_parent() {
        let parent = Signal::new();
        let child = parent.child();
        child.cancel();
        assert!(!parent.is_cancelled());

        let other = parent.child();
        parent.cancel();
        assert!(other.is_cancelled());
    }

    #[tokio::test]
    async fn any_of_fires_on_the_last_of_many_sources() {
        let sources: Vec<Signal> = (0..64).map(|_| Signal::new()).collect();
        let any = Signal::any_of(sources.clone());
        assert!(!any.is_cancelled());

        sources[63].cancel();
        tokio::time::timeout(Duration::from_secs(1), any.cancelled())
            .await
            .expect("composite must fire");
        assert!(sources[..63].iter().all(|s| !s.is_cancelled()));
    }

    #[tokio::test]
    async fn any_of_single_source_is_passthrough() {
        let only = Signal::new();
        let any = Signal::any_of([only.clone()]);
        only.cancel();
        assert!(any.is_cancelled());
    }

    #[tokio::test]
    async fn any_of_already_cancelled_source_fires_immediately() {
        let a = Signal::new();
        let b = Signal::new();
        b.cancel();
        assert!(Signal::any_of([a, b]).is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn any_of_nothing_never_fires_by_itself() {
        let any = Signal::any_of(Vec::new());
        let waited = tokio::time::timeout(Duration::from_secs(3600), any.cancelled()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn cancelling_composite_leaves_sources_active() {
        let a = Signal::new();
        let b = Signal::new();
        let any = Signal::any_of([a.clone(), b.clone()]);
        any.cancel();
        tokio::task::yield_now().await;
        assert!(!a.is_cancelled());
        assert!(!b.is_cancelled());
    }
}
