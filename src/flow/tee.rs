//! Duplicating a stream to two consumers.

use crate::error::StreamError;
use crate::flow::{Signal, Stream, channel, spawn_stage};

/// Delivers every item of `input` to both outputs.
///
/// Per item, the two deliveries race each other, so a slow branch delays but
/// never reorders the other. Each branch gets each value at most once. If
/// `signal` fires mid-item, the still pending branch may miss that value.
/// A branch whose consumer went away is skipped from then on; the stage ends
/// when both are gone.
pub fn tee<T>(signal: &Signal, input: Stream<T>) -> (Stream<T>, Stream<T>)
where
    T: Clone + Send + 'static,
{
    let (left_out, left) = channel();
    let (right_out, right) = channel();
    let signal = signal.clone();
    let mut input = input;
    spawn_stage("tee", async move {
        let (mut left_open, mut right_open) = (true, true);
        while let Some(v) = input.recv_or_done(&signal).await {
            let (mut to_left, mut to_right) = (left_open, right_open);
            while to_left || to_right {
                tokio::select! {
                    biased;
                    _ = signal.cancelled() => return Err(StreamError::Cancelled),
                    res = left_out.deliver(v.clone()), if to_left => {
                        to_left = false;
                        left_open = res.is_ok();
                    }
                    res = right_out.deliver(v.clone()), if to_right => {
                        to_right = false;
                        right_open = res.is_ok();
                    }
                }
            }
            if !left_open && !right_open {
                return Err(StreamError::Disconnected);
            }
        }
        Ok(())
    });
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::generator;

    #[tokio::test]
    async fn both_branches_get_every_item_in_order() {
        let signal = Signal::new();
        let (left, right) = tee(&signal, generator(&signal, 0..50));
        let (l, r) = tokio::join!(left.into_vec(), right.into_vec());
        assert_eq!(l, (0..50).collect::<Vec<_>>());
        assert_eq!(r, l);
    }

    #[tokio::test]
    async fn cancel_bounds_each_branch() {
        let signal = Signal::new();
        let m = 20usize;
        let (mut left, mut right) = tee(&signal, generator(&signal, 0..m));

        let j = 5usize;
        for expected in 0..j {
            assert_eq!(left.recv().await, Some(expected));
            assert_eq!(right.recv().await, Some(expected));
        }
        signal.cancel();

        let l = j + left.into_vec().await.len();
        let r = j + right.into_vec().await.len();
        assert!((j..=m).contains(&l), "left got {l}");
        assert!((j..=m).contains(&r), "right got {r}");
    }

    #[tokio::test]
    async fn dropped_branch_does_not_stall_the_other() {
        let signal = Signal::new();
        let (left, right) = tee(&signal, generator(&signal, 0..10));
        drop(right);
        assert_eq!(left.into_vec().await, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn stops_and_releases_input_when_both_branches_are_gone() {
        let signal = Signal::new();
        let (tx, rx) = channel::<u8>();
        let (left, right) = tee(&signal, rx);
        drop((left, right));

        tx.send(&signal, 1).await.expect("tee reads one item");
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while !tx.is_closed() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("tee must drop its input");
    }
}
