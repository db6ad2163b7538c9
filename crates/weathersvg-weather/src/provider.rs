//! Open-Meteo forecast and BigDataCloud reverse geocoding clients.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;
use url::Url;
use weathersvg_core::{CacheConfig, WeatherConfig};

use crate::cache::{cache_key, FetchCache};
use crate::types::{parse_local_time, ReverseGeocoding, Weather, WeatherError};

pub const USER_AGENT: &str = "weather.svg/1.0";

const CURRENT_VARIABLES: &str = "temperature_2m,relative_humidity_2m,precipitation,weather_code,cloud_cover,pressure_msl,wind_speed_10m,is_day";
const HOURLY_VARIABLES: &str = "temperature_2m,relative_humidity_2m,precipitation_probability,precipitation,weather_code,pressure_msl";
const DAILY_VARIABLES: &str = "weather_code,temperature_2m_max,temperature_2m_min,precipitation_sum,precipitation_hours,precipitation_probability_max,sunrise,sunset";

/// Forwarding proxy for forecast requests: the target URL is appended,
/// URL-encoded, to `url`.
#[derive(Clone)]
pub struct ProxySettings {
    pub url: String,
    pub authorization: Option<String>,
}

impl std::fmt::Debug for ProxySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxySettings")
            .field("url", &self.url)
            .field("authorization", &self.authorization.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// How long fetched bodies stay cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub weather_min: Duration,
    pub weather_max: Duration,
    pub geocoding: Duration,
}

impl From<&CacheConfig> for TtlPolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            weather_min: Duration::from_secs(config.weather_ttl_min_secs),
            weather_max: Duration::from_secs(config.weather_ttl_max_secs),
            geocoding: Duration::from_secs(config.geocoding_ttl_secs),
        }
    }
}

/// Seconds until Open-Meteo publishes the next observation, clamped to the
/// policy bounds.
///
/// `current.time` is local time; subtracting the UTC offset and adding the
/// update interval gives the next update instant.
pub fn weather_cache_ttl(weather: &Weather, now: DateTime<Utc>, policy: &TtlPolicy) -> Duration {
    let min = policy.weather_min.as_secs() as i64;
    let max = (policy.weather_max.as_secs() as i64).max(min);

    let Some(local) = parse_local_time(&weather.current.time) else {
        return policy.weather_min;
    };
    let next_update =
        local.and_utc().timestamp() - weather.utc_offset_seconds + weather.current.interval;

    let remaining_ms = next_update * 1000 - now.timestamp_millis();
    let remaining = (remaining_ms as f64 / 1000.0).round() as i64;
    Duration::from_secs(remaining.clamp(min, max) as u64)
}

fn base_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, no-transform"),
    );
    headers
}

/// Client for the two upstream services, sharing one fetch cache.
pub struct WeatherClient {
    client: Client,
    forecast_url: Url,
    geocoding_url: Url,
    geocoding_api_key: String,
    proxy: Option<ProxySettings>,
    ttl: TtlPolicy,
    cache: Arc<dyn FetchCache>,
}

impl WeatherClient {
    pub fn new(
        config: &WeatherConfig,
        cache_config: &CacheConfig,
        cache: Arc<dyn FetchCache>,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .default_headers(base_headers())
            .build()?;

        let proxy = config
            .proxy_url
            .as_ref()
            .filter(|url| !url.is_empty())
            .map(|url| ProxySettings {
                url: url.clone(),
                authorization: config.proxy_authorization.clone(),
            });

        Ok(Self {
            client,
            forecast_url: Url::parse(&config.forecast_url)?,
            geocoding_url: Url::parse(&config.geocoding_url)?,
            geocoding_api_key: config.geocoding_api_key.clone(),
            proxy,
            ttl: TtlPolicy::from(cache_config),
            cache,
        })
    }

    /// Forecast request URL for the given coordinates.
    pub fn forecast_request_url(&self, latitude: &str, longitude: &str) -> Url {
        let mut url = self.forecast_url.clone();
        url.query_pairs_mut()
            .append_pair("timezone", "auto")
            .append_pair("timeformat", "iso8601")
            .append_pair("temperature_unit", "celsius")
            .append_pair("precipitation_unit", "mm")
            .append_pair("wind_speed_unit", "ms")
            .append_pair("current", CURRENT_VARIABLES)
            .append_pair("hourly", HOURLY_VARIABLES)
            .append_pair("daily", DAILY_VARIABLES)
            .append_pair("latitude", latitude)
            .append_pair("longitude", longitude);
        url
    }

    /// Reverse geocoding request URL; `language` picks the locality language.
    pub fn geocoding_request_url(&self, latitude: &str, longitude: &str, language: &str) -> Url {
        let mut url = self.geocoding_url.clone();
        url.query_pairs_mut()
            .append_pair("latitude", latitude)
            .append_pair("longitude", longitude)
            .append_pair("localityLanguage", language)
            .append_pair("key", &self.geocoding_api_key);
        url
    }

    /// Current conditions plus hourly and daily series.
    #[instrument(skip_all, level = "info")]
    pub async fn forecast(&self, latitude: &str, longitude: &str) -> Result<Weather, WeatherError> {
        let url = self.forecast_request_url(latitude, longitude);
        let policy = self.ttl;
        self.cached_fetch(&url, self.proxy.as_ref(), |weather: &Weather| {
            weather_cache_ttl(weather, Utc::now(), &policy)
        })
        .await
    }

    /// Locality name for the coordinates, in `language` where available.
    #[instrument(skip(self, latitude, longitude), level = "info")]
    pub async fn reverse_geocode(
        &self,
        latitude: &str,
        longitude: &str,
        language: &str,
    ) -> Result<ReverseGeocoding, WeatherError> {
        let url = self.geocoding_request_url(latitude, longitude, language);
        let ttl = self.ttl.geocoding;
        self.cached_fetch(&url, None, |_: &ReverseGeocoding| ttl).await
    }

    async fn cached_fetch<T: DeserializeOwned>(
        &self,
        url: &Url,
        proxy: Option<&ProxySettings>,
        ttl: impl FnOnce(&T) -> Duration,
    ) -> Result<T, WeatherError> {
        let key = cache_key(url);

        if let Some(cached) = self.cache.get(&key) {
            match serde_json::from_value(cached) {
                Ok(value) => {
                    tracing::debug!("Fetch cache hit: {}", key);
                    return Ok(value);
                }
                Err(e) => tracing::warn!("Discarding unreadable cache entry {}: {}", key, e),
            }
        }

        let body = self.fetch_json(url, proxy).await?;
        let value: T = serde_json::from_value(body.clone())
            .map_err(|e| WeatherError::Parse(format!("{}: {}", url.origin().ascii_serialization(), e)))?;

        let ttl = ttl(&value);
        tracing::debug!("Caching {} for {}s", key, ttl.as_secs());
        self.cache.put(&key, body, ttl);

        Ok(value)
    }

    async fn fetch_json(&self, url: &Url, proxy: Option<&ProxySettings>) -> Result<Value, WeatherError> {
        let request = match proxy {
            Some(proxy) => {
                let target = format!("{}{}", proxy.url, urlencoding::encode(url.as_str()));
                let mut request = self.client.get(target);
                if let Some(authorization) = &proxy.authorization {
                    request = request.header("Proxy-Authorization", authorization);
                }
                request
            }
            None => self.client.get(url.clone()),
        };

        // Request URLs carry coordinates and the geocoding key.
        let response = request
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status {
                status,
                origin: url.origin().ascii_serialization(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| WeatherError::Network(e.without_url()))
    }
}

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("forecast_url", &self.forecast_url.as_str())
            .field("geocoding_url", &self.geocoding_url.as_str())
            .field("proxy", &self.proxy)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use chrono::TimeZone;

    fn weather_at(time: &str, utc_offset_seconds: i64, interval: i64) -> Weather {
        serde_json::from_value(serde_json::json!({
            "latitude": 35.0,
            "longitude": 139.0,
            "utc_offset_seconds": utc_offset_seconds,
            "timezone": "Asia/Tokyo",
            "current": {
                "time": time,
                "interval": interval,
                "temperature_2m": 10.0,
                "relative_humidity_2m": 50,
                "precipitation": 0,
                "weather_code": 0,
                "pressure_msl": 1013,
                "wind_speed_10m": 1.0,
                "is_day": 1
            },
            "hourly": {"time": []},
            "daily": {"time": [], "sunrise": [], "sunset": []}
        }))
        .unwrap()
    }

    fn policy() -> TtlPolicy {
        TtlPolicy {
            weather_min: Duration::from_secs(60),
            weather_max: Duration::from_secs(900),
            geocoding: Duration::from_secs(86400),
        }
    }

    #[test]
    fn test_ttl_until_next_update() {
        // 17:00 JST is 08:00 UTC; next update at 08:15 UTC
        let weather = weather_at("2024-01-03T17:00", 9 * 3600, 900);
        let now = Utc.with_ymd_and_hms(2024, 1, 3, 8, 10, 0).unwrap();
        assert_eq!(weather_cache_ttl(&weather, now, &policy()), Duration::from_secs(300));
    }

    #[test]
    fn test_ttl_is_clamped() {
        let weather = weather_at("2024-01-03T17:00", 9 * 3600, 900);

        let late = Utc.with_ymd_and_hms(2024, 1, 3, 9, 0, 0).unwrap();
        assert_eq!(weather_cache_ttl(&weather, late, &policy()), Duration::from_secs(60));

        let early = Utc.with_ymd_and_hms(2024, 1, 3, 6, 0, 0).unwrap();
        assert_eq!(weather_cache_ttl(&weather, early, &policy()), Duration::from_secs(900));
    }

    #[test]
    fn test_ttl_for_unparseable_time() {
        let weather = weather_at("yesterday", 0, 900);
        assert_eq!(
            weather_cache_ttl(&weather, Utc::now(), &policy()),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn test_forecast_url_parameters() {
        let client = WeatherClient::new(
            &WeatherConfig::default(),
            &CacheConfig::default(),
            Arc::new(MemoryCache::new()),
        )
        .unwrap();
        let url = client.forecast_request_url("35.0", "139.0");

        assert_eq!(url.host_str(), Some("api.open-meteo.com"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("latitude".into(), "35.0".into())));
        assert!(pairs.contains(&("wind_speed_unit".into(), "ms".into())));
        assert!(pairs.contains(&("current".into(), CURRENT_VARIABLES.into())));
    }

    #[test]
    fn test_geocoding_url_parameters() {
        let config = WeatherConfig {
            geocoding_api_key: "secret".into(),
            ..WeatherConfig::default()
        };
        let client =
            WeatherClient::new(&config, &CacheConfig::default(), Arc::new(MemoryCache::new()))
                .unwrap();
        let url = client.geocoding_request_url("35.0", "139.0", "ja");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("localityLanguage".into(), "ja".into())));
        assert!(pairs.contains(&("key".into(), "secret".into())));
    }

    #[test]
    fn test_debug_redacts_proxy_authorization() {
        let proxy = ProxySettings {
            url: "https://proxy.example/?u=".into(),
            authorization: Some("Basic abc".into()),
        };
        assert!(!format!("{:?}", proxy).contains("abc"));
    }
}
