pub mod config;
pub mod error;

pub use config::{
    AssetsConfig, CacheConfig, Config, LocationConfig, RenderConfig, ServerConfig,
    ValidationResult, WeatherConfig,
};
pub use error::{AppError, ConfigError, KeyError, UpstreamError};

use anyhow::Result;

/// Initialize logging for the service.
///
/// The filter is read from `RUST_LOG` and defaults to `info`.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("weather.svg core initialized");
    Ok(())
}
