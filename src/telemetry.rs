//! Tracing bootstrap for binaries and tests.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter directive.
pub const LOG_ENV_VAR: &str = "STOREFRONT_LOG";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Defaults to `info` if `STOREFRONT_LOG` is unset.
///
/// Panics if a global subscriber is already installed.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(filter())
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Like [`init_tracing`], but returns an error instead of panicking when a
/// subscriber is already set. Test output goes through the test writer.
pub fn try_init_tracing() -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(filter())
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init()
}
