//! Flattening a stream of streams.
//!
//! The bridge gives consumers one stable output while the stage feeding it is
//! replaced: each restart publishes a fresh inner stream and the bridge moves
//! on once the previous one has closed.
//!
//! ```text
//!   gen #1: a b c ┐
//!   gen #2: a b   ├──► bridge ──► a b c a b a ...
//!   gen #3: a ... ┘
//! ```

use crate::flow::{Signal, Stream, channel, spawn_stage};

/// Consumes each inner stream to completion, in arrival order, before moving
/// to the next one. Closes when the outer stream closes or `signal` fires.
pub fn bridge<T>(signal: &Signal, streams: Stream<Stream<T>>) -> Stream<T>
where
    T: Send + 'static,
{
    let (out, stream) = channel();
    let signal = signal.clone();
    let mut streams = streams;
    spawn_stage("bridge", async move {
        while let Some(mut inner) = streams.recv_or_done(&signal).await {
            while let Some(v) = inner.recv_or_done(&signal).await {
                out.send(&signal, v).await?;
            }
        }
        Ok(())
    });
    stream
}
