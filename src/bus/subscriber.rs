//! Core subscriber traits for the service bus.

use super::publisher::{Event, PublishError};

/// Trait for consuming events from one channel subscription.
///
/// This is a pull-based interface. Delivery is at-least-once: an event that is
/// nacked, or never acked, may be delivered again.
pub trait Subscriber: Send + Sync {
    /// Poll for the next event, blocking until one is available or timeout.
    fn poll(&self, timeout_ms: u64) -> Result<Option<Event>, PublishError>;

    /// Acknowledge that an event has been processed.
    fn ack(&self, event_id: &str) -> Result<(), PublishError>;

    /// Reject an event (will be redelivered or sent to dead letter queue).
    fn nack(&self, event_id: &str, reason: &str) -> Result<(), PublishError>;
}

/// Trait for buses that hand out per-channel subscriptions.
///
/// Each call to `subscribe` creates an independent consumer group with its own
/// read position. Cloning the returned subscription yields competing consumers
/// that share that position.
pub trait Subscribable: Send + Sync {
    type Subscription: Subscriber + Clone + 'static;

    /// Subscribe to a named channel.
    fn subscribe(&self, channel: &str) -> Self::Subscription;
}
