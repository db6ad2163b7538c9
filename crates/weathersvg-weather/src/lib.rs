//! Weather data for weather.svg
//!
//! Fetches forecasts from Open-Meteo and locality names from BigDataCloud,
//! caching response bodies until the next upstream update.

pub mod cache;
pub mod provider;
pub mod types;

pub use cache::{
    cache_key, FetchCache, MemoryCache, DEFAULT_MAX_ENTRIES, DEFAULT_PURGE_INTERVAL,
};
pub use provider::{weather_cache_ttl, ProxySettings, TtlPolicy, WeatherClient, USER_AGENT};
pub use types::*;
