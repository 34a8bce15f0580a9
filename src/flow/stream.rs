//! # Single-producer streams with an ownership-based close protocol.
//!
//! A stream is a bounded tokio `mpsc` channel split into two halves:
//! - [`Emitter`]: the producer half, owned by exactly one stage;
//! - [`Stream`]: the consumer half, handed downstream.
//!
//! ## Rules
//! - **Close = drop.** The stream ends when its emitter is dropped, so a stage
//!   closes its output on every exit path (return, `?`, cancellation, unwind).
//! - **After close** every receive yields `None`; values are never invented.
//! - **Writing after close is unrepresentable**: the emitter *is* the right to write.
//! - Every blocking send/receive has a variant racing a [`Signal`]; cancellation
//!   is checked first (`biased`), so it always wins a tie.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::{Mutex, mpsc};

use crate::error::StreamError;
use crate::flow::Signal;

/// Default stream capacity (closest tokio equivalent of a rendezvous channel).
pub const DEFAULT_CAPACITY: usize = 1;

/// Creates a stream with [`DEFAULT_CAPACITY`].
pub fn channel<T>() -> (Emitter<T>, Stream<T>) {
    Stream::with_capacity(DEFAULT_CAPACITY)
}

/// Producer half of a stream. Dropping it closes the stream.
#[derive(Debug)]
pub struct Emitter<T> {
    tx: mpsc::Sender<T>,
}

impl<T> Emitter<T> {
    /// Sends `value`, waiting for capacity, unless `signal` fires first.
    ///
    /// - `Err(Cancelled)`: the signal fired; `value` is dropped.
    /// - `Err(Disconnected)`: the consumer dropped its [`Stream`].
    pub async fn send(&self, signal: &Signal, value: T) -> Result<(), StreamError> {
        tokio::select! {
            biased;
            _ = signal.cancelled() => Err(StreamError::Cancelled),
            res = self.deliver(value) => res,
        }
    }

    /// Non-blocking send; drops `value` and returns `false` if nobody has room for it.
    pub fn try_send(&self, value: T) -> bool {
        self.tx.try_send(value).is_ok()
    }

    /// Returns `true` if the consumer half was dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Sends without a cancellation race; callers race it themselves.
    pub(crate) async fn deliver(&self, value: T) -> Result<(), StreamError> {
        self.tx
            .send(value)
            .await
            .map_err(|_| StreamError::Disconnected)
    }

    /// Second producer handle for merge stages; the stream closes once every
    /// handle is gone.
    pub(crate) fn share(&self) -> Emitter<T> {
        Emitter {
            tx: self.tx.clone(),
        }
    }
}

/// Consumer half of a stream.
///
/// Iterate with [`recv`](Self::recv) / [`recv_or_done`](Self::recv_or_done),
/// or through [`futures::Stream`]. A stream is not restartable: once it ends,
/// getting more values means building a new stage.
#[derive(Debug)]
pub struct Stream<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> Stream<T> {
    /// Creates a stream buffering up to `capacity` values (minimum 1).
    pub fn with_capacity(capacity: usize) -> (Emitter<T>, Stream<T>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Emitter { tx }, Stream { rx })
    }

    /// Receives the next value; `None` once the stream is closed and drained.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Receives the next value unless `signal` fires first.
    ///
    /// `None` means "stop reading": either end of stream or cancellation.
    pub async fn recv_or_done(&mut self, signal: &Signal) -> Option<T> {
        tokio::select! {
            biased;
            _ = signal.cancelled() => None,
            v = self.rx.recv() => v,
        }
    }

    /// Non-blocking receive.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Drains the stream to its end.
    pub async fn into_vec(mut self) -> Vec<T> {
        let mut out = Vec::new();
        while let Some(v) = self.rx.recv().await {
            out.push(v);
        }
        out
    }
}

impl<T> From<mpsc::Receiver<T>> for Stream<T> {
    fn from(rx: mpsc::Receiver<T>) -> Self {
        Self { rx }
    }
}

impl<T> From<mpsc::Sender<T>> for Emitter<T> {
    fn from(tx: mpsc::Sender<T>) -> Self {
        Self { tx }
    }
}

impl<T> futures::Stream for Stream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.poll_recv(cx)
    }
}

/// A stream several stages read from, competing for items.
pub(crate) struct SharedStream<T> {
    inner: Arc<Mutex<Stream<T>>>,
}

impl<T> Clone for SharedStream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SharedStream<T> {
    pub(crate) fn new(stream: Stream<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(stream)),
        }
    }

    /// Takes the next item; exactly one reader gets each value.
    pub(crate) async fn recv_or_done(&self, signal: &Signal) -> Option<T> {
        let mut guard = tokio::select! {
            biased;
            _ = signal.cancelled() => return None,
            g = self.inner.lock() => g,
        };
        guard.recv_or_done(signal).await
    }
}
