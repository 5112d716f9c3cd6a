//! Service Bus - wraps a publisher and its subscription source for a service.

use super::{Event, PublishError, Publisher, Subscribable};

/// Service bus - wraps publisher and subscription source for a service.
///
/// Each service in the system holds its own `Bus`. Egress publishes through it,
/// ingress workers obtain channel subscriptions from it.
///
/// ## Example
///
/// ```ignore
/// let bus = Bus::from_queue(InMemoryQueue::new());
///
/// bus.publish("cart-events", Event::with_string_payload("evt-1", "CartCleared", "CartCleared:..."))?;
///
/// let sub = bus.subscribe("cart-events");
/// if let Some(event) = sub.poll(1000)? {
///     sub.ack(&event.id)?;
/// }
/// ```
#[derive(Clone)]
pub struct Bus<P: Publisher, S: Subscribable> {
    publisher: P,
    source: S,
}

impl<P: Publisher, S: Subscribable> Bus<P, S> {
    /// Create a new bus with the given publisher and subscription source.
    pub fn new(publisher: P, source: S) -> Self {
        Self { publisher, source }
    }

    /// Get a reference to the underlying publisher.
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Get a reference to the underlying subscription source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<P: Publisher, S: Subscribable> Publisher for Bus<P, S> {
    fn publish(&self, channel: &str, event: Event) -> Result<(), PublishError> {
        self.publisher.publish(channel, event)
    }

    fn publish_batch(&self, channel: &str, events: Vec<Event>) -> Result<(), PublishError> {
        self.publisher.publish_batch(channel, events)
    }
}

impl<P: Publisher, S: Subscribable> Subscribable for Bus<P, S> {
    type Subscription = S::Subscription;

    fn subscribe(&self, channel: &str) -> Self::Subscription {
        self.source.subscribe(channel)
    }
}

// Convenience: when publisher and source are the same type (e.g., InMemoryQueue)
impl<T: Publisher + Subscribable + Clone> Bus<T, T> {
    /// Create a bus from a unified queue that both publishes and subscribes.
    pub fn from_queue(queue: T) -> Self {
        Self {
            publisher: queue.clone(),
            source: queue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{InMemoryQueue, Subscriber};
    use std::sync::{Arc, Mutex};

    struct RecordingPublisher {
        sent: Arc<Mutex<Vec<(String, Event)>>>,
    }

    impl Publisher for RecordingPublisher {
        fn publish(&self, channel: &str, event: Event) -> Result<(), PublishError> {
            self.sent
                .lock()
                .map_err(|_| PublishError::LockPoisoned("record"))?
                .push((channel.to_string(), event));
            Ok(())
        }
    }

    #[test]
    fn bus_publish_and_poll() {
        let bus = Bus::from_queue(InMemoryQueue::new());
        let sub = bus.subscribe("orders");

        bus.publish("orders", Event::with_string_payload("evt-1", "OrderCreated", "{}"))
            .unwrap();

        let event = sub.poll(100).unwrap().unwrap();
        assert_eq!(event.event_type, "OrderCreated");
    }

    #[test]
    fn split_publisher_and_source() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let bus = Bus::new(
            RecordingPublisher {
                sent: Arc::clone(&sent),
            },
            InMemoryQueue::new(),
        );

        bus.publish_batch(
            "cart-events",
            vec![
                Event::with_string_payload("evt-1", "A", "a"),
                Event::with_string_payload("evt-2", "B", "b"),
            ],
        )
        .unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|(channel, _)| channel == "cart-events"));
        // nothing reached the source queue
        assert!(bus.source().is_empty());
    }
}
