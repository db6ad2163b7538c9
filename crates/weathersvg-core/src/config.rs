use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable pointing at an alternative config file.
pub const CONFIG_PATH_ENV: &str = "WEATHERSVG_CONFIG";

/// Deployment secrets are read from these variables and override the file.
pub const ENV_PRIVATE_KEY: &str = "JWK_RSA_PRIVATE_KEY";
pub const ENV_GEOCODING_API_KEY: &str = "API_KEY_BIG_DATA_CLOUD";
pub const ENV_PROXY_URL: &str = "PROXY_URL";
pub const ENV_PROXY_AUTHORIZATION: &str = "PROXY_AUTHORIZATION";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Summarize all errors on one line
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Listening port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    /// RSA-OAEP private key as a serialized JSON Web Key.
    ///
    /// Usually supplied through `JWK_RSA_PRIVATE_KEY` rather than the file.
    pub private_key_jwk: Option<String>,
}

impl std::fmt::Debug for LocationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationConfig")
            .field(
                "private_key_jwk",
                &self.private_key_jwk.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Open-Meteo forecast endpoint
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    /// BigDataCloud reverse geocoding endpoint
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,

    /// BigDataCloud API key
    #[serde(default)]
    pub geocoding_api_key: String,

    /// Optional forwarding proxy; the target URL is appended URL-encoded
    #[serde(default)]
    pub proxy_url: Option<String>,

    /// Value for the `Proxy-Authorization` header sent to the proxy
    #[serde(default)]
    pub proxy_authorization: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_geocoding_url() -> String {
    "https://api-bdc.net/data/reverse-geocode".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_url: default_forecast_url(),
            geocoding_url: default_geocoding_url(),
            geocoding_api_key: String::new(),
            proxy_url: None,
            proxy_authorization: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("forecast_url", &self.forecast_url)
            .field("geocoding_url", &self.geocoding_url)
            .field("geocoding_api_key", &"<redacted>")
            .field("proxy_url", &self.proxy_url)
            .field(
                "proxy_authorization",
                &self.proxy_authorization.as_ref().map(|_| "<redacted>"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lower bound for the weather cache TTL in seconds
    #[serde(default = "default_weather_ttl_min")]
    pub weather_ttl_min_secs: u64,

    /// Upper bound for the weather cache TTL in seconds
    #[serde(default = "default_weather_ttl_max")]
    pub weather_ttl_max_secs: u64,

    /// TTL for reverse geocoding results in seconds
    #[serde(default = "default_geocoding_ttl")]
    pub geocoding_ttl_secs: u64,

    /// Upper bound on cached upstream responses
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_weather_ttl_min() -> u64 {
    60
}

fn default_weather_ttl_max() -> u64 {
    15 * 60
}

fn default_geocoding_ttl() -> u64 {
    24 * 60 * 60
}

fn default_max_entries() -> usize {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            weather_ttl_min_secs: default_weather_ttl_min(),
            weather_ttl_max_secs: default_weather_ttl_max(),
            geocoding_ttl_secs: default_geocoding_ttl(),
            max_entries: default_max_entries(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Fail loudly on malformed markup instead of dropping it.
    ///
    /// Meant for development; production renders what it can.
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Directory of prebuilt `<symbol>` fragments, one `<id>.svg` per icon
    #[serde(default)]
    pub icons_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default location and overlay the
    /// environment. A missing file is not an error.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from an explicit path without touching the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: Config = toml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Overlay deployment secrets from the environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(jwk) = non_empty(ENV_PRIVATE_KEY) {
            self.location.private_key_jwk = Some(jwk);
        }
        if let Some(key) = non_empty(ENV_GEOCODING_API_KEY) {
            self.weather.geocoding_api_key = key;
        }
        if let Some(proxy) = non_empty(ENV_PROXY_URL) {
            self.weather.proxy_url = Some(proxy);
        }
        if let Some(auth) = non_empty(ENV_PROXY_AUTHORIZATION) {
            self.weather.proxy_authorization = Some(auth);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.server.port == 0 {
            result.add_error("server.port", "Port cannot be 0");
        }

        self.validate_url(&self.weather.forecast_url, "weather.forecast_url", &mut result);
        self.validate_url(&self.weather.geocoding_url, "weather.geocoding_url", &mut result);

        if let Some(proxy) = &self.weather.proxy_url {
            self.validate_url(proxy, "weather.proxy_url", &mut result);
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.weather.geocoding_api_key.is_empty() {
            result.add_warning(
                "weather.geocoding_api_key",
                "No geocoding API key - locations without a name cannot be labelled",
            );
        }

        if self.cache.weather_ttl_min_secs > self.cache.weather_ttl_max_secs {
            result.add_error(
                "cache.weather_ttl_min_secs",
                "Minimum weather TTL exceeds the maximum",
            );
        }

        match &self.location.private_key_jwk {
            None => result.add_warning(
                "location.private_key_jwk",
                "No private key configured - weather requests will fail",
            ),
            Some(jwk) if serde_json::from_str::<serde_json::Value>(jwk).is_err() => {
                result.add_error("location.private_key_jwk", "Private key is not valid JSON")
            }
            Some(_) => {}
        }

        if let Some(dir) = &self.assets.icons_dir {
            if !dir.is_dir() {
                result.add_warning(
                    "assets.icons_dir",
                    format!("Icon directory does not exist: {}", dir.display()),
                );
            }
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("weathersvg");

        Ok(config_dir.join("config.toml"))
    }
}
