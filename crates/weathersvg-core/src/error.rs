//! Service-wide error types.
//!
//! Each crate keeps its own detailed errors. Handlers funnel whatever they
//! cannot recover from into [`AppError`], whose `user_message()` is the only
//! text that reaches a response body.

use thiserror::Error;

/// Top-level service error type.
///
/// The `Display` output may carry internal details and belongs in logs only.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Message for a response body. Never includes key material,
    /// coordinates or upstream payloads.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Key(e) => e.user_message(),
            AppError::Upstream(e) => e.user_message(),
            AppError::Config(_) | AppError::Io(_) | AppError::Other(_) => "Internal Server Error",
        }
    }
}

/// Configuration file and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration validation failed: {0}")]
    Invalid(String),
}

/// Key material errors surfaced outside the location crate.
///
/// The location crate has its own detailed error types; this one only
/// records which stage failed so the cause can be logged.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Private key not configured")]
    NotConfigured,

    #[error("Private key could not be imported: {0}")]
    Import(String),
}

impl KeyError {
    pub fn user_message(&self) -> &'static str {
        "Internal Server Error"
    }
}

/// Failures fetching the data the widget is rendered from.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Failed to fetch weather data: {0}")]
    Weather(String),

    #[error("Failed to fetch location data: {0}")]
    Geocoding(String),
}

impl UpstreamError {
    pub fn user_message(&self) -> &'static str {
        match self {
            UpstreamError::Weather(_) => "Failed to fetch weather data",
            UpstreamError::Geocoding(_) => "Failed to fetch location data",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_error_conversion() {
        let app_err: AppError = KeyError::NotConfigured.into();
        assert!(matches!(app_err, AppError::Key(KeyError::NotConfigured)));
    }

    #[test]
    fn test_user_message_hides_details() {
        let app_err = AppError::Key(KeyError::Import("n: invalid base64".into()));
        assert_eq!(app_err.user_message(), "Internal Server Error");
        assert!(app_err.to_string().contains("invalid base64"));
    }

    #[test]
    fn test_upstream_user_messages() {
        let weather: AppError = UpstreamError::Weather("HTTP 503".into()).into();
        assert_eq!(weather.user_message(), "Failed to fetch weather data");

        let geocoding: AppError = UpstreamError::Geocoding("timeout".into()).into();
        assert_eq!(geocoding.user_message(), "Failed to fetch location data");
    }

    #[test]
    fn test_io_and_other_are_generic() {
        let io: AppError = std::io::Error::other("disk").into();
        assert_eq!(io.user_message(), "Internal Server Error");

        let other: AppError = anyhow::anyhow!("boom").into();
        assert_eq!(other.user_message(), "Internal Server Error");
    }
}
