//! Logging system for hookwright.
//!
//! Provides structured logging through `tracing` with a configurable level
//! and output format.

use hookwright_types::{GenerationError, LogConfig, LogFormat, LogLevel, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither `RUST_LOG` nor a config entry is present.
pub const DEFAULT_FILTER: &str = "hookwright=info";

/// Initialize the logging system with default configuration.
pub fn init_default() -> Result<()> {
    init(None, LogFormat::Pretty)
}

/// Initialize logging from configuration.
///
/// The first configured output decides level and format; `RUST_LOG` still
/// takes precedence over the level.
pub fn init_from_config(configs: &[LogConfig]) -> Result<()> {
    match configs.first() {
        Some(config) => init(Some(config.level), config.format),
        None => init_default(),
    }
}

/// Initialize logging with an explicit level and format.
pub fn init(level: Option<LogLevel>, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match level {
        Some(level) => EnvFilter::new(format!("hookwright={}", level.as_filter())),
        None => EnvFilter::new(DEFAULT_FILTER),
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| GenerationError::Config(format!("Failed to initialize logging: {}", e)))
}
