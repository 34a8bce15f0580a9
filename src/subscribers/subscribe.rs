//! # Subscriber contract.
//!
//! Each subscriber runs on its own worker, fed by a bounded queue owned by
//! the [`SubscriberSet`](crate::subscribers::SubscriberSet). A slow
//! subscriber never delays a steward; once its queue is full, further events
//! for it are dropped and reported as `SubscriberOverflow`.

use async_trait::async_trait;

use crate::events::Event;

/// Handler for supervision events.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Name used in overflow/panic reports.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this subscriber's queue (min 1).
    fn queue_capacity(&self) -> usize {
        1024
    }
}
