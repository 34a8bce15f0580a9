//! Sources that report liveness alongside their values.

use std::time::Duration;

use crate::flow::{Signal, Stream, channel, spawn_stage};
use crate::heartbeat::{Heartbeat, Pacemaker, heartbeat};

/// Emits `values` once, pulsing every `pulse_interval` while waiting on a
/// slow consumer. Both streams close when the stage exits.
pub fn pulsing_generator<T>(
    signal: &Signal,
    pulse_interval: Duration,
    values: Vec<T>,
) -> (Heartbeat, Stream<T>)
where
    T: Send + 'static,
{
    let (pulses, beats) = heartbeat();
    let (out, stream) = channel();
    let signal = signal.clone();
    spawn_stage("pulsing_generator", async move {
        let mut pacemaker = Pacemaker::new(pulses, pulse_interval);
        for v in values {
            pacemaker.send_with_pulse(&signal, &out, v).await?;
        }
        Ok(())
    });
    (beats, stream)
}

/// Emits `values` once, pulsing right before each unit of work.
///
/// Useful in tests: every value is preceded by a pulse a monitor can wait for,
/// independent of wall-clock intervals.
pub fn pulse_per_item<T>(signal: &Signal, values: Vec<T>) -> (Heartbeat, Stream<T>)
where
    T: Send + 'static,
{
    let (pulses, beats) = heartbeat();
    let (out, stream) = channel();
    let signal = signal.clone();
    spawn_stage("pulse_per_item", async move {
        for v in values {
            pulses.pulse();
            out.send(&signal, v).await?;
        }
        Ok(())
    });
    (beats, stream)
}
