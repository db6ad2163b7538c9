use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Open-Meteo timestamps: local time, no offset, minute precision.
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Parse an Open-Meteo local timestamp (`2024-01-03T17:00`).
pub fn parse_local_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, LOCAL_TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Open-Meteo forecast response for the variables this service requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub generationtime_ms: f64,
    pub utc_offset_seconds: i64,
    pub timezone: String,
    #[serde(default)]
    pub timezone_abbreviation: String,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default)]
    pub current_units: BTreeMap<String, String>,
    pub current: Current,
    #[serde(default)]
    pub hourly_units: BTreeMap<String, String>,
    pub hourly: Hourly,
    #[serde(default)]
    pub daily_units: BTreeMap<String, String>,
    pub daily: Daily,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current {
    pub time: String,
    /// Seconds between model updates
    pub interval: i64,
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub precipitation: f64,
    pub weather_code: i32,
    #[serde(default)]
    pub cloud_cover: f64,
    pub pressure_msl: f64,
    pub wind_speed_10m: f64,
    pub is_day: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hourly {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<Option<f64>>,
    #[serde(default)]
    pub weather_code: Vec<Option<i32>>,
    #[serde(default)]
    pub pressure_msl: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Daily {
    pub time: Vec<String>,
    #[serde(default)]
    pub weather_code: Vec<Option<i32>>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_hours: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability_max: Vec<Option<f64>>,
    pub sunrise: Vec<String>,
    pub sunset: Vec<String>,
}

impl Weather {
    /// Local time of the current observation.
    pub fn current_time(&self) -> Option<NaiveDateTime> {
        parse_local_time(&self.current.time)
    }

    /// Index of today in the daily series.
    pub fn daily_index(&self) -> Option<usize> {
        let today = self.current_time()?.date();
        self.daily
            .time
            .iter()
            .position(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok() == Some(today))
    }

    /// Index of the first hourly slot at or after the current observation.
    pub fn hourly_index(&self) -> Option<usize> {
        // Same fixed-width format on both sides, so string order is time order
        self.hourly
            .time
            .iter()
            .position(|time| time.as_str() >= self.current.time.as_str())
    }

    /// Today's sunrise and sunset, local time.
    pub fn sun_times(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let index = self.daily_index()?;
        let sunrise = parse_local_time(self.daily.sunrise.get(index)?)?;
        let sunset = parse_local_time(self.daily.sunset.get(index)?)?;
        Some((sunrise, sunset))
    }

    /// Precipitation probability for the current hour, in percent.
    pub fn precipitation_probability(&self) -> Option<f64> {
        let index = self.hourly_index()?;
        self.hourly
            .precipitation_probability
            .get(index)
            .copied()
            .flatten()
    }

    pub fn is_day(&self) -> bool {
        self.current.is_day != 0
    }
}

/// BigDataCloud reverse geocoding response (fields this service reads).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseGeocoding {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub lookup_source: String,
    pub locality_language_requested: String,
    #[serde(default)]
    pub continent: Option<String>,
    #[serde(default)]
    pub continent_code: String,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub principal_subdivision: Option<String>,
    #[serde(default)]
    pub principal_subdivision_code: Option<String>,
    #[serde(default)]
    pub city: String,
    pub locality: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub plus_code: String,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Upstream returned {status} for {origin}")]
    Status {
        status: reqwest::StatusCode,
        origin: String,
    },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_weather() -> Weather {
        serde_json::from_value(serde_json::json!({
            "latitude": 35.7,
            "longitude": 139.75,
            "generationtime_ms": 0.1,
            "utc_offset_seconds": 32400,
            "timezone": "Asia/Tokyo",
            "timezone_abbreviation": "JST",
            "elevation": 40.0,
            "current_units": {"time": "iso8601", "interval": "seconds"},
            "current": {
                "time": "2024-01-03T17:00",
                "interval": 900,
                "temperature_2m": 8.4,
                "relative_humidity_2m": 52,
                "precipitation": 0.0,
                "weather_code": 3,
                "cloud_cover": 100,
                "pressure_msl": 1012.3,
                "wind_speed_10m": 2.6,
                "is_day": 0
            },
            "hourly": {
                "time": ["2024-01-03T16:00", "2024-01-03T17:00", "2024-01-03T18:00"],
                "precipitation_probability": [10, null, 30]
            },
            "daily": {
                "time": ["2024-01-02", "2024-01-03"],
                "sunrise": ["2024-01-02T06:50", "2024-01-03T06:51"],
                "sunset": ["2024-01-02T16:39", "2024-01-03T16:40"]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_local_time() {
        assert!(parse_local_time("2024-01-03T17:00").is_some());
        assert!(parse_local_time("2024-01-03T17:00:30").is_some());
        assert!(parse_local_time("2024-01-03").is_none());
    }

    #[test]
    fn test_indices() {
        let weather = sample_weather();
        assert_eq!(weather.daily_index(), Some(1));
        assert_eq!(weather.hourly_index(), Some(1));
        assert_eq!(weather.precipitation_probability(), None);
        assert!(!weather.is_day());
    }

    #[test]
    fn test_sun_times() {
        let (sunrise, sunset) = sample_weather().sun_times().unwrap();
        assert_eq!(sunrise.to_string(), "2024-01-03 06:51:00");
        assert_eq!(sunset.to_string(), "2024-01-03 16:40:00");
    }

    #[test]
    fn test_reverse_geocoding_field_names() {
        let geo: ReverseGeocoding = serde_json::from_value(serde_json::json!({
            "latitude": 35.7,
            "longitude": 139.75,
            "localityLanguageRequested": "ja",
            "countryName": "日本",
            "city": "千代田区",
            "locality": "神田",
            "localityInfo": {"administrative": [], "informative": []}
        }))
        .unwrap();
        assert_eq!(geo.locality, "神田");
        assert_eq!(geo.locality_language_requested, "ja");
        assert_eq!(geo.country_name.as_deref(), Some("日本"));
    }
}
