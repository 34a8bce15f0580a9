//! # LogWriter: renders events through `tracing`.
//!
//! Restarts and grace failures are logged at `warn`/`error`, the rest at
//! `info`/`debug`. Install a `tracing` subscriber in the binary to see them.

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Creates a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let steward = e.steward.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::StewardStarted => {
                tracing::info!(steward, "[steward-started]");
            }
            EventKind::StewardStopped => {
                tracing::info!(steward, generation = ?e.generation, "[steward-stopped]");
            }
            EventKind::WardStarting => {
                tracing::debug!(steward, generation = ?e.generation, "[ward-starting]");
            }
            EventKind::WardHealthy => {
                tracing::debug!(steward, generation = ?e.generation, "[ward-healthy]");
            }
            EventKind::WardUnhealthy => {
                tracing::warn!(
                    steward,
                    generation = ?e.generation,
                    timeout_ms = ?e.timeout_ms,
                    "[ward-unhealthy]"
                );
            }
            EventKind::RestartScheduled => {
                tracing::info!(
                    steward,
                    after_generation = ?e.generation,
                    delay_ms = ?e.delay_ms,
                    "[restart-scheduled]"
                );
            }
            EventKind::ShutdownRequested => {
                tracing::info!("[shutdown-requested]");
            }
            EventKind::AllStoppedWithin => {
                tracing::info!("[all-stopped-within-grace]");
            }
            EventKind::GraceExceeded => {
                tracing::error!("[grace-exceeded]");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(subscriber = steward, reason = ?e.reason, "[subscriber-overflow]");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(subscriber = steward, info = ?e.reason, "[subscriber-panicked]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handles_every_kind() {
        let w = LogWriter::new();
        for kind in [
            EventKind::StewardStarted,
            EventKind::WardUnhealthy,
            EventKind::RestartScheduled,
            EventKind::GraceExceeded,
            EventKind::SubscriberPanicked,
        ] {
            w.on_event(&Event::new(kind).with_steward("s")).await;
        }
    }
}
