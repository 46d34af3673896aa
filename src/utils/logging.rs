//! # Logging Setup
//!
//! Structured logging initialization from [`LoggingConfig`]. The `RUST_LOG`
//! environment variable, when set, overrides the configured level.

use crate::config::LoggingConfig;
use crate::error::{ProtocolError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Fails if a subscriber is already installed; embedding applications that
/// configure their own logging should simply skip this call.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| ProtocolError::ConfigError(format!("Failed to initialize logging: {e}")))
}
