//! Service Bus - channel-based event publishing and consumption.
//!
//! This module is the event-bus collaborator seen by the rest of the crate:
//! egress publishes onto named channels, ingress workers pull from channel
//! subscriptions and acknowledge or reject each delivery.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Bus (per service)                         │
//! │  - Wraps Publisher + Subscribable                           │
//! │  - publish(channel, event) / subscribe(channel)             │
//! └─────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Publisher + Subscriber Traits                   │
//! │  Publisher: publish(channel, event) / publish_batch(..)     │
//! │  Subscriber: poll(timeout) / ack(id) / nack(id, reason)     │
//! └─────────────────────────────────────────────────────────────┘
//!          │                  │                     │
//!          ▼                  ▼                     ▼
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────────────┐
//! │InMemoryQueue│    │ KafkaQueue  │    │   AmqpQueue         │
//! │ (included)  │    │ (external)  │    │   (external)        │
//! └─────────────┘    └─────────────┘    └─────────────────────┘
//! ```
//!
//! Delivery is at-least-once and unordered across consumers. Nothing in this
//! crate deduplicates redelivered messages.

#[allow(clippy::module_inception)]
mod bus;
mod in_memory_queue;
mod publisher;
mod subscriber;

pub use bus::Bus;
pub use in_memory_queue::{DeadLetter, InMemoryQueue, InMemorySubscription};
pub use publisher::{Event, PublishError, Publisher, CONTENT_TYPE};
pub use subscriber::{Subscribable, Subscriber};
