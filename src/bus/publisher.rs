//! Core publisher types for the service bus.

use thiserror::Error;
use uuid::Uuid;

/// Metadata key carrying the payload content type.
pub const CONTENT_TYPE: &str = "content-type";

/// A message travelling on a bus channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// Unique identifier for this delivery (used for ack/nack)
    pub id: String,
    /// Event type (e.g., "CartItemAdded", "OrderCreated")
    pub event_type: String,
    /// Serialized payload (JSON or a positional string)
    pub payload: Vec<u8>,
    /// Optional metadata (headers, content type, etc.)
    pub metadata: Option<Vec<(String, String)>>,
}

impl Event {
    /// Create a new event with the given type and payload.
    pub fn new(id: impl Into<String>, event_type: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            payload,
            metadata: None,
        }
    }

    /// Create an event with a freshly generated id.
    pub fn with_generated_id(event_type: impl Into<String>, payload: Vec<u8>) -> Self {
        Self::new(Uuid::new_v4().to_string(), event_type, payload)
    }

    /// Create an event with a string payload.
    pub fn with_string_payload(
        id: impl Into<String>,
        event_type: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self::new(id, event_type, payload.into().into_bytes())
    }

    /// Add metadata to the event.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    /// Look up a metadata value by key.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get the payload as a string (if valid UTF-8).
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    /// Lossy payload rendering for log lines.
    pub fn payload_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Error type for bus operations.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Connection to the bus failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// Serialization of the event failed
    #[error("serialization failed: {0}")]
    SerializationFailed(String),
    /// The bus rejected the event
    #[error("event rejected: {0}")]
    Rejected(String),
    /// Timeout waiting for acknowledgment
    #[error("publish timeout")]
    Timeout,
    /// An internal lock was poisoned by a panicking thread
    #[error("bus lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

impl From<serde_json::Error> for PublishError {
    fn from(err: serde_json::Error) -> Self {
        PublishError::SerializationFailed(err.to_string())
    }
}

/// Trait for publishing events onto named bus channels.
///
/// Implementations might include:
/// - `InMemoryQueue` - For testing and single-process scenarios
/// - `KafkaPublisher` - channel maps to a topic
/// - `AmqpPublisher` - channel maps to an exchange
pub trait Publisher: Send + Sync {
    /// Publish a single event to a channel.
    fn publish(&self, channel: &str, event: Event) -> Result<(), PublishError>;

    /// Publish multiple events to a channel.
    ///
    /// Default implementation publishes events sequentially.
    fn publish_batch(&self, channel: &str, events: Vec<Event>) -> Result<(), PublishError> {
        for event in events {
            self.publish(channel, event)?;
        }
        Ok(())
    }
}

impl<P: Publisher + ?Sized> Publisher for std::sync::Arc<P> {
    fn publish(&self, channel: &str, event: Event) -> Result<(), PublishError> {
        (**self).publish(channel, event)
    }
}
