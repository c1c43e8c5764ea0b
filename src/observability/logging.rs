//! Structured logging initialization.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::ObservabilityConfig;

/// Initialize the tracing subscriber from configuration.
///
/// The environment (`RUST_LOG`) wins over the configured level when set.
pub fn init_logging(config: &ObservabilityConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let fmt_layer = if config.log_json {
        tracing_subscriber::fmt::layer().json().with_ansi(false).boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
