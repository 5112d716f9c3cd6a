//! Layered node configuration.
//!
//! Sources, later overriding earlier:
//! 1. `storefront.yaml` in the working directory (if present)
//! 2. the file passed to [`Config::load`] (required if given)
//! 3. the file named by `STOREFRONT_CONFIG` (required if set)
//! 4. `STOREFRONT__*` environment variables, `__` separating nested keys
//!    (e.g. `STOREFRONT__BUS__POLL_INTERVAL_MS=10`)

use std::time::Duration;

use serde::Deserialize;

use crate::codec::CartEventFormat;
use crate::events::channels;

pub use ::config::ConfigError;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "storefront.yaml";
/// Environment variable naming an extra configuration file.
pub const CONFIG_ENV_VAR: &str = "STOREFRONT_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "STOREFRONT";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service_name: String,
    pub bus: BusConfig,
    pub channels: ChannelConfig,
    pub cart_events: CartEventsConfig,
    pub inventory: InventoryConfig,
    pub pool: PoolConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "storefront".to_string(),
            bus: BusConfig::default(),
            channels: ChannelConfig::default(),
            cart_events: CartEventsConfig::default(),
            inventory: InventoryConfig::default(),
            pool: PoolConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Defaults with a short bus poll interval.
    pub fn for_test() -> Self {
        Self {
            service_name: "storefront-test".to_string(),
            bus: BusConfig {
                poll_interval_ms: 5,
                ..BusConfig::default()
            },
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// How long one ingress poll waits for a message.
    pub poll_interval_ms: u64,
    /// Competing ingress workers per subscription.
    pub workers_per_channel: usize,
}

impl BusConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 50,
            workers_per_channel: 1,
        }
    }
}

/// Channel names, one per event stream.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub product_created: String,
    pub product_updated: String,
    pub product_deleted: String,
    pub cart_events: String,
    pub order_created: String,
    pub order_updated: String,
    pub order_deleted: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            product_created: channels::PRODUCT_CREATED.to_string(),
            product_updated: channels::PRODUCT_UPDATED.to_string(),
            product_deleted: channels::PRODUCT_DELETED.to_string(),
            cart_events: channels::CART_EVENTS.to_string(),
            order_created: channels::ORDER_CREATED.to_string(),
            order_updated: channels::ORDER_UPDATED.to_string(),
            order_deleted: channels::ORDER_DELETED.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CartEventsConfig {
    /// Outbound format. Inbound cart events are accepted in either format.
    pub format: CartEventFormat,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub wrap_in_envelope: bool,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            wrap_in_envelope: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.service_name, "storefront");
        assert_eq!(config.bus.poll_interval(), Duration::from_millis(50));
        assert_eq!(config.bus.workers_per_channel, 1);
        assert_eq!(config.channels.cart_events, "cart-events");
        assert_eq!(config.channels.order_created, "order-created-events");
        assert_eq!(config.cart_events.format, CartEventFormat::Tagged);
        assert!(config.inventory.wrap_in_envelope);
        assert_eq!(config.pool.workers, 4);
    }

    #[test]
    fn for_test_polls_fast() {
        let config = Config::for_test();
        assert!(config.bus.poll_interval_ms < 50);
        assert_eq!(config.channels.product_deleted, "product-deleted");
    }

    #[test]
    fn load_from_explicit_file() {
        let path = std::env::temp_dir().join(format!("storefront-{}.yaml", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "service_name: carts\nbus:\n  poll_interval_ms: 7\ncart_events:\n  format: positional\nchannels:\n  cart_events: carts-v2\n"
        )
        .unwrap();

        let config = Config::load(path.to_str()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.service_name, "carts");
        assert_eq!(config.bus.poll_interval_ms, 7);
        assert_eq!(config.bus.workers_per_channel, 1);
        assert_eq!(config.cart_events.format, CartEventFormat::Positional);
        assert_eq!(config.channels.cart_events, "carts-v2");
        assert_eq!(config.channels.product_created, "product-created");
    }

    #[test]
    fn missing_explicit_file_fails() {
        assert!(Config::load(Some("/definitely/not/here/storefront.yaml")).is_err());
    }
}
