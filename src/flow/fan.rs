//! Fan-out (competing readers) and fan-in (merge).
//!
//! ```text
//!                 ┌──► worker 0 ──► out[0] ──┐
//!   input ──(shared)──► worker 1 ──► out[1] ──┼──► fan_in ──► merged
//!                 └──► worker N ──► out[N] ──┘
//! ```
//!
//! Fan-out is **not** a broadcast: every item goes to exactly one worker.
//! Fan-in keeps the order of items coming from the same source and closes once
//! every source has closed (or the signal fires).

use std::sync::Arc;

use crate::flow::{SharedStream, Signal, Stream, channel, spawn_stage};

/// Splits `input` across `width` independent stages competing for items.
///
/// `width == 0` yields no outputs and drops `input`.
pub fn fan_out<T>(signal: &Signal, input: Stream<T>, width: usize) -> Vec<Stream<T>>
where
    T: Send + 'static,
{
    fan_out_map(signal, input, width, |v| v)
}

/// Like [`fan_out`], with every worker applying `f` to the items it takes.
///
/// The usual shape for spreading a slow, order-insensitive stage over several
/// workers and then merging with [`fan_in`].
pub fn fan_out_map<T, U, F>(
    signal: &Signal,
    input: Stream<T>,
    width: usize,
    f: F,
) -> Vec<Stream<U>>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    let shared = SharedStream::new(input);
    let f = Arc::new(f);

    (0..width)
        .map(|_| {
            let (out, stream) = channel();
            let signal = signal.clone();
            let shared = shared.clone();
            let f = Arc::clone(&f);
            spawn_stage("fan_out", async move {
                while let Some(v) = shared.recv_or_done(&signal).await {
                    out.send(&signal, f(v)).await?;
                }
                Ok(())
            });
            stream
        })
        .collect()
}

/// Merges `inputs` into one stream.
///
/// One forwarder per source shares the merged emitter; the merged stream
/// closes once the last forwarder exits.
pub fn fan_in<T>(signal: &Signal, inputs: Vec<Stream<T>>) -> Stream<T>
where
    T: Send + 'static,
{
    let (out, stream) = channel();
    for mut input in inputs {
        let out = out.share();
        let signal = signal.clone();
        spawn_stage("fan_in", async move {
            while let Some(v) = input.recv_or_done(&signal).await {
                out.send(&signal, v).await?;
            }
            Ok(())
        });
    }
    stream
}
