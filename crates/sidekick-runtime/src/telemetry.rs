//! Tracing subscriber setup

use sidekick_core::{SidekickError, SidekickResult};
use tracing_subscriber::EnvFilter;

use crate::LoggingConfig;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` overrides the configured filter. Fails instead of panicking
/// if a global subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> SidekickResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| SidekickError::Telemetry(e.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| SidekickError::Telemetry(e.to_string()))
}
