//! Source stages: finite, cyclic and function-driven generators.

use crate::flow::{Signal, Stream, channel, spawn_stage};

/// Emits `values` in order, then closes.
///
/// Stops early (and closes) if `signal` fires or the consumer goes away.
pub fn generator<T, I>(signal: &Signal, values: I) -> Stream<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
{
    let (out, stream) = channel();
    let signal = signal.clone();
    let values = values.into_iter();
    spawn_stage("generator", async move {
        for v in values {
            out.send(&signal, v).await?;
        }
        Ok(())
    });
    stream
}

/// Cycles through `values` until `signal` fires.
///
/// An empty set has nothing to cycle and closes immediately.
pub fn repeat<T>(signal: &Signal, values: Vec<T>) -> Stream<T>
where
    T: Clone + Send + Sync + 'static,
{
    let (out, stream) = channel();
    let signal = signal.clone();
    spawn_stage("repeat", async move {
        if values.is_empty() {
            return Ok(());
        }
        loop {
            for v in &values {
                out.send(&signal, v.clone()).await?;
            }
        }
    });
    stream
}

/// Emits `f()` forever, until `signal` fires.
///
/// `f` runs once per value, right before the value is offered downstream.
pub fn repeat_fn<T, F>(signal: &Signal, mut f: F) -> Stream<T>
where
    T: Send + 'static,
    F: FnMut() -> T + Send + 'static,
{
    let (out, stream) = channel();
    let signal = signal.clone();
    spawn_stage("repeat_fn", async move {
        loop {
            out.send(&signal, f()).await?;
        }
    });
    stream
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::take;

    #[tokio::test]
    async fn generator_preserves_order() {
        let signal = Signal::new();
        let got = generator(&signal, 0..5).into_vec().await;
        assert_eq!(got, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn generator_stops_when_cancelled_first() {
        let signal = Signal::new();
        signal.cancel();
        let got = generator(&signal, 0..1_000).into_vec().await;
        assert!(got.len() <= 1, "at most the buffered value, got {got:?}");
    }

    #[tokio::test]
    async fn repeat_cycles_in_order() {
        let signal = Signal::new();
        let got = take(&signal, repeat(&signal, vec!['a', 'b', 'c']), 7)
            .into_vec()
            .await;
        assert_eq!(got, vec!['a', 'b', 'c', 'a', 'b', 'c', 'a']);
        signal.cancel();
    }

    #[tokio::test]
    async fn repeat_of_nothing_closes() {
        let signal = Signal::new();
        assert!(repeat::<u8>(&signal, Vec::new()).into_vec().await.is_empty());
    }

    #[tokio::test]
    async fn repeat_fn_calls_in_sequence() {
        let signal = Signal::new();
        let mut n = 0;
        let counter = repeat_fn(&signal, move || {
            n += 1;
            n
        });
        assert_eq!(take(&signal, counter, 3).into_vec().await, vec![1, 2, 3]);
        signal.cancel();
    }
}
