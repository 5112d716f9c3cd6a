//! In-memory queue for testing and single-process deployments.
//!
//! This module provides a thread-safe in-memory bus with named channels that
//! implements both `Publisher` and `Subscribable`, useful for:
//! - Unit and integration testing without a broker
//! - Running several services inside one process
//! - Reproducing duplicate delivery deterministically

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use super::{Event, PublishError, Publisher, Subscribable, Subscriber};

/// A message rejected by a consumer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeadLetter {
    pub channel: String,
    pub event: Event,
    pub reason: String,
}

/// In-memory bus for testing and single-process scenarios.
///
/// Features:
/// - Thread-safe (can be shared across threads via `Clone`)
/// - One append-only log per channel
/// - Each subscription tracks its own read position
/// - Nacked events are moved to a dead-letter list, never redelivered
///
/// ## Example
///
/// ```
/// use storefront_sync::bus::{Event, InMemoryQueue, Publisher, Subscribable, Subscriber};
///
/// let queue = InMemoryQueue::new();
/// let sub = queue.subscribe("order-created-events");
///
/// queue
///     .publish("order-created-events", Event::with_string_payload("evt-1", "OrderCreated", "{}"))
///     .unwrap();
///
/// let event = sub.poll(100).unwrap().unwrap();
/// assert_eq!(event.event_type, "OrderCreated");
/// sub.ack(&event.id).unwrap();
/// assert_eq!(queue.acknowledged(), vec!["evt-1".to_string()]);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryQueue {
    /// Per-channel event logs
    channels: Arc<RwLock<HashMap<String, Vec<Event>>>>,
    /// Acknowledged event IDs, across all subscriptions
    acked: Arc<Mutex<Vec<String>>>,
    /// Nacked events, across all subscriptions
    dead_letters: Arc<Mutex<Vec<DeadLetter>>>,
}

impl InMemoryQueue {
    /// Create a new in-memory queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all events published to a channel.
    pub fn events(&self, channel: &str) -> Vec<Event> {
        self.channels
            .read()
            .map(|channels| channels.get(channel).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Get the event types published to a channel, in order.
    pub fn event_types(&self, channel: &str) -> Vec<String> {
        self.events(channel)
            .into_iter()
            .map(|e| e.event_type)
            .collect()
    }

    /// Find all events on a channel matching a type.
    pub fn find_all_by_type(&self, channel: &str, event_type: &str) -> Vec<Event> {
        self.events(channel)
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Total number of events across all channels.
    pub fn len(&self) -> usize {
        self.channels
            .read()
            .map(|channels| channels.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// Check if no event was ever published.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append an already-published event to its channel again.
    ///
    /// Simulates at-least-once redelivery by the broker. Returns false when no
    /// event with that id exists on the channel.
    pub fn redeliver(&self, channel: &str, event_id: &str) -> Result<bool, PublishError> {
        let mut channels = self
            .channels
            .write()
            .map_err(|_| PublishError::LockPoisoned("redeliver"))?;
        let Some(log) = channels.get_mut(channel) else {
            return Ok(false);
        };
        match log.iter().find(|e| e.id == event_id).cloned() {
            Some(event) => {
                log.push(event);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Get acknowledged event IDs.
    pub fn acknowledged(&self) -> Vec<String> {
        self.acked.lock().map(|a| a.clone()).unwrap_or_default()
    }

    /// Get nacked events.
    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        self.dead_letters
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    /// Clear all channels, acks and dead letters (useful for test cleanup).
    ///
    /// Existing subscriptions keep their positions; create new ones afterwards.
    pub fn clear(&self) {
        if let Ok(mut channels) = self.channels.write() {
            channels.clear();
        }
        if let Ok(mut acked) = self.acked.lock() {
            acked.clear();
        }
        if let Ok(mut dead) = self.dead_letters.lock() {
            dead.clear();
        }
    }
}

impl Publisher for InMemoryQueue {
    fn publish(&self, channel: &str, event: Event) -> Result<(), PublishError> {
        self.channels
            .write()
            .map_err(|_| PublishError::LockPoisoned("publish"))?
            .entry(channel.to_string())
            .or_default()
            .push(event);
        Ok(())
    }

    fn publish_batch(&self, channel: &str, events: Vec<Event>) -> Result<(), PublishError> {
        self.channels
            .write()
            .map_err(|_| PublishError::LockPoisoned("publish batch"))?
            .entry(channel.to_string())
            .or_default()
            .extend(events);
        Ok(())
    }
}

impl Subscribable for InMemoryQueue {
    type Subscription = InMemorySubscription;

    fn subscribe(&self, channel: &str) -> InMemorySubscription {
        InMemorySubscription {
            queue: self.clone(),
            channel: channel.to_string(),
            position: Arc::new(Mutex::new(0)),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// A consumer group on one channel of an `InMemoryQueue`.
///
/// Clones share the read position, so several worker threads polling clones of
/// the same subscription compete for messages.
#[derive(Clone)]
pub struct InMemorySubscription {
    queue: InMemoryQueue,
    channel: String,
    position: Arc<Mutex<usize>>,
    in_flight: Arc<Mutex<HashMap<String, Event>>>,
}

impl InMemorySubscription {
    /// The channel this subscription reads.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Get the current read position.
    pub fn current_position(&self) -> usize {
        self.position.lock().map(|p| *p).unwrap_or(0)
    }

    /// Number of delivered events awaiting ack or nack.
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().map(|f| f.len()).unwrap_or(0)
    }

    fn try_next(&self) -> Result<Option<Event>, PublishError> {
        let channels = self
            .queue
            .channels
            .read()
            .map_err(|_| PublishError::LockPoisoned("poll"))?;
        let mut pos = self
            .position
            .lock()
            .map_err(|_| PublishError::LockPoisoned("poll position"))?;

        let Some(event) = channels.get(&self.channel).and_then(|log| log.get(*pos)) else {
            return Ok(None);
        };
        *pos += 1;
        let event = event.clone();
        self.in_flight
            .lock()
            .map_err(|_| PublishError::LockPoisoned("poll in-flight"))?
            .insert(event.id.clone(), event.clone());
        Ok(Some(event))
    }
}

impl Subscriber for InMemorySubscription {
    fn poll(&self, timeout_ms: u64) -> Result<Option<Event>, PublishError> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);

        loop {
            if let Some(event) = self.try_next()? {
                return Ok(Some(event));
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }

            // Small sleep to avoid busy-waiting
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn ack(&self, event_id: &str) -> Result<(), PublishError> {
        self.in_flight
            .lock()
            .map_err(|_| PublishError::LockPoisoned("ack"))?
            .remove(event_id)
            .ok_or_else(|| PublishError::Rejected(format!("unknown delivery {}", event_id)))?;
        self.queue
            .acked
            .lock()
            .map_err(|_| PublishError::LockPoisoned("ack"))?
            .push(event_id.to_string());
        Ok(())
    }

    fn nack(&self, event_id: &str, reason: &str) -> Result<(), PublishError> {
        let event = self
            .in_flight
            .lock()
            .map_err(|_| PublishError::LockPoisoned("nack"))?
            .remove(event_id)
            .ok_or_else(|| PublishError::Rejected(format!("unknown delivery {}", event_id)))?;
        self.queue
            .dead_letters
            .lock()
            .map_err(|_| PublishError::LockPoisoned("nack"))?
            .push(DeadLetter {
                channel: self.channel.clone(),
                event,
                reason: reason.to_string(),
            });
        Ok(())
    }
}
