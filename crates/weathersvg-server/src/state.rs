//! Per-process state shared by all requests.

use std::sync::Arc;

use weathersvg_core::{AppError, Config, KeyError};
use weathersvg_location::{LocationPrivateKey, PublicKeyCache};
use weathersvg_markup::RenderMode;
use weathersvg_weather::{MemoryCache, WeatherClient, DEFAULT_PURGE_INTERVAL};
use weathersvg_widget::IconSet;

pub struct AppState {
    pub private_key: LocationPrivateKey,
    pub public_key: PublicKeyCache,
    pub weather: WeatherClient,
    pub icons: IconSet,
    pub render_mode: RenderMode,
}

impl AppState {
    /// Build the state from a validated configuration.
    ///
    /// # Errors
    ///
    /// Fails when the private key is absent or unusable, or when the icon
    /// directory cannot be read.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let private_jwk = config
            .location
            .private_key_jwk
            .as_deref()
            .filter(|jwk| !jwk.trim().is_empty())
            .ok_or(KeyError::NotConfigured)?;

        let weather = WeatherClient::new(
            &config.weather,
            &config.cache,
            Arc::new(MemoryCache::with_limits(
                config.cache.max_entries,
                DEFAULT_PURGE_INTERVAL,
            )),
        )
        .map_err(|e| anyhow::anyhow!("Failed to build weather client: {}", e))?;

        let icons = match &config.assets.icons_dir {
            Some(dir) => IconSet::load_dir(dir)?,
            None => {
                tracing::warn!("No icon directory configured, icons will not be embedded");
                IconSet::new()
            }
        };

        let render_mode = if config.render.strict {
            RenderMode::Strict
        } else {
            RenderMode::Lenient
        };

        Self::new(private_jwk, weather, icons, render_mode)
    }

    /// # Errors
    ///
    /// Fails when `private_jwk` is not a usable RSA-OAEP-256 private key.
    pub fn new(
        private_jwk: &str,
        weather: WeatherClient,
        icons: IconSet,
        render_mode: RenderMode,
    ) -> Result<Self, AppError> {
        let private_key = LocationPrivateKey::import(private_jwk)
            .map_err(|e| KeyError::Import(e.to_string()))?;

        Ok(Self {
            private_key,
            public_key: PublicKeyCache::new(private_jwk),
            weather,
            icons,
            render_mode,
        })
    }
}
