//! Outbound domain events.
//!
//! `EventPublisher` turns typed events into bus [`Event`]s: it picks the
//! channel, encodes the payload, stamps a fresh delivery id and the
//! `content-type` metadata, and hands the result to the underlying
//! [`Publisher`].

use tracing::debug;

use crate::bus::{Event, PublishError, Publisher, CONTENT_TYPE};
use crate::codec::{encode_cart_message, encode_json, wrap_envelope, CartEventFormat};
use crate::config::{ChannelConfig, Config};
use crate::events::{CartEvent, OrderEvent, ProductChanged, ProductDeleted};

const JSON: &str = "application/json";

#[derive(Clone)]
pub struct EventPublisher<P: Publisher> {
    publisher: P,
    channels: ChannelConfig,
    cart_format: CartEventFormat,
    wrap_products: bool,
}

impl<P: Publisher> EventPublisher<P> {
    /// Default channel names, tagged cart events, unwrapped product events.
    pub fn new(publisher: P) -> Self {
        Self {
            publisher,
            channels: ChannelConfig::default(),
            cart_format: CartEventFormat::default(),
            wrap_products: false,
        }
    }

    pub fn from_config(publisher: P, config: &Config) -> Self {
        Self {
            publisher,
            channels: config.channels.clone(),
            cart_format: config.cart_events.format,
            wrap_products: config.inventory.wrap_in_envelope,
        }
    }

    pub fn with_cart_format(mut self, format: CartEventFormat) -> Self {
        self.cart_format = format;
        self
    }

    /// Wrap product events in the `message` envelope field.
    pub fn with_product_envelope(mut self, wrap: bool) -> Self {
        self.wrap_products = wrap;
        self
    }

    pub fn channels(&self) -> &ChannelConfig {
        &self.channels
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn publish_cart(&self, event: &CartEvent) -> Result<(), PublishError> {
        let payload = encode_cart_message(event, self.cart_format)?;
        let channel = self.channels.cart_events.as_str();
        self.send(
            channel,
            event.kind(),
            payload,
            self.cart_format.content_type(),
        )
    }

    pub fn publish_order(&self, event: &OrderEvent) -> Result<(), PublishError> {
        let channel = match event {
            OrderEvent::OrderCreated { .. } => &self.channels.order_created,
            OrderEvent::OrderUpdated { .. } => &self.channels.order_updated,
            OrderEvent::OrderDeleted { .. } => &self.channels.order_deleted,
        };
        self.send(channel, event.kind(), encode_json(event)?, JSON)
    }

    pub fn publish_product_created(&self, event: &ProductChanged) -> Result<(), PublishError> {
        let payload = self.product_payload("ProductCreated", event)?;
        self.send(&self.channels.product_created, "ProductCreated", payload, JSON)
    }

    pub fn publish_product_updated(&self, event: &ProductChanged) -> Result<(), PublishError> {
        let payload = self.product_payload("ProductUpdated", event)?;
        self.send(&self.channels.product_updated, "ProductUpdated", payload, JSON)
    }

    pub fn publish_product_deleted(&self, event: &ProductDeleted) -> Result<(), PublishError> {
        let payload = self.product_payload("ProductDeleted", event)?;
        self.send(&self.channels.product_deleted, "ProductDeleted", payload, JSON)
    }

    fn product_payload<T: serde::Serialize>(
        &self,
        message_type: &str,
        event: &T,
    ) -> Result<Vec<u8>, serde_json::Error> {
        if self.wrap_products {
            wrap_envelope(message_type, event)
        } else {
            encode_json(event)
        }
    }

    fn send(
        &self,
        channel: &str,
        event_type: &str,
        payload: Vec<u8>,
        content_type: &str,
    ) -> Result<(), PublishError> {
        let event =
            Event::with_generated_id(event_type, payload).with_metadata(CONTENT_TYPE, content_type);
        debug!(channel, event_type, event_id = %event.id, "publishing event");
        self.publisher.publish(channel, event)
    }
}
