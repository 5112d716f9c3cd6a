//! Event ingress: decode, apply, then ack or nack.
//!
//! ```text
//!  Subscriber ──poll──► IngressWorker ──► Consumer::handle ──► replica / service
//!       ▲                      │
//!       └──── ack / nack ◄─────┘
//! ```
//!
//! A [`Consumer`] owns the decode-and-apply step for one channel. Whatever
//! it returns is turned into an acknowledgment by [`process`]; ingress
//! failures never escape as errors. Redelivered messages are applied again:
//! there is no deduplication.

mod consumers;
mod worker;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::bus::{Event, Subscriber};
use crate::codec::DecodeError;

pub use consumers::{CartEventConsumer, OrderCreatedConsumer, StockConsumer};
pub use worker::{IngressStats, IngressWorker};

/// Why a message could not be applied.
#[derive(Debug, Error)]
pub enum IngressError {
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    /// The message decoded but its side effect failed.
    #[error("side effect rejected: {0}")]
    Rejected(String),
}

/// The acknowledgment decided for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Ack,
    Nack(String),
}

impl Disposition {
    pub fn is_ack(&self) -> bool {
        matches!(self, Disposition::Ack)
    }
}

/// Applies messages from one channel.
pub trait Consumer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Decode the message and apply it. Must not mutate anything on a decode error.
    fn handle(&self, event: &Event) -> Result<(), IngressError>;
}

impl<C: Consumer + ?Sized> Consumer for std::sync::Arc<C> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn handle(&self, event: &Event) -> Result<(), IngressError> {
        (**self).handle(event)
    }
}

/// Handle one delivered message and acknowledge it accordingly.
///
/// Bus failures while acking are logged; the decided disposition is returned
/// either way.
pub fn process<C, S>(consumer: &C, subscriber: &S, event: &Event) -> Disposition
where
    C: Consumer + ?Sized,
    S: Subscriber + ?Sized,
{
    debug!(consumer = consumer.name(), event_id = %event.id, event_type = %event.event_type, "message received");

    let disposition = match consumer.handle(event) {
        Ok(()) => Disposition::Ack,
        Err(err) => {
            warn!(
                consumer = consumer.name(),
                event_id = %event.id,
                error = %err,
                payload = %event.payload_lossy(),
                "message rejected"
            );
            Disposition::Nack(err.to_string())
        }
    };

    let result = match &disposition {
        Disposition::Ack => subscriber.ack(&event.id),
        Disposition::Nack(reason) => subscriber.nack(&event.id, reason),
    };
    if let Err(err) = result {
        error!(consumer = consumer.name(), event_id = %event.id, error = %err, "acknowledgment failed");
    }
    disposition
}
