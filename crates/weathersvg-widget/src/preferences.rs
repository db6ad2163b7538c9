//! Display preferences from the query string.
//!
//! Every unit and the time format may be `auto`, in which case it is
//! inferred from the display language.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use unic_langid::LanguageIdentifier;
use weathersvg_location::is_valid_language_tag;

use crate::conversion::{LengthUnit, PressureUnit, SpeedUnit, TemperatureUnit};

/// Used when neither `lang` nor `Accept-Language` names a usable language.
pub const FALLBACK_LANGUAGE: &str = "en-US";

const AUTO: &str = "auto";

/// Regions that use metric units despite an English language.
const METRIC_ENGLISH_REGIONS: &[&str] = &["AU", "CA", "GB", "IE", "IN", "NZ", "ZA"];

const FAHRENHEIT_REGIONS: &[&str] = &[
    "AS", "BS", "BZ", "FM", "GU", "KY", "LR", "MH", "MP", "PR", "PW", "US", "VI",
];

const INCH_REGIONS: &[&str] = &[
    "AS", "BS", "BZ", "FM", "GB", "GU", "KY", "LR", "MH", "MP", "PR", "PW", "US", "VI",
];

/// A user choice, or `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference<T> {
    Auto,
    Fixed(T),
}

impl<T> Default for Preference<T> {
    fn default() -> Self {
        Self::Auto
    }
}

impl<T: Copy> Preference<T> {
    pub fn resolve(&self, inferred: T) -> T {
        match self {
            Self::Auto => inferred,
            Self::Fixed(value) => *value,
        }
    }
}

impl<T: FromStr> FromStr for Preference<T> {
    type Err = T::Err;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == AUTO {
            Ok(Self::Auto)
        } else {
            value.parse().map(Self::Fixed)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFormat {
    /// `5:07 PM`
    H12,
    /// `05:07`
    H24,
    /// `5:07`
    H24n,
    /// The language's own medium date and short time.
    Native,
}

impl TimeFormat {
    pub const ALL: &[TimeFormat] = &[Self::H12, Self::H24, Self::H24n, Self::Native];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::H12 => "12h",
            Self::H24 => "24h",
            Self::H24n => "24hn",
            Self::Native => "native",
        }
    }
}

impl FromStr for TimeFormat {
    type Err = crate::conversion::ParseUnitError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.as_str() == value)
            .ok_or_else(|| crate::conversion::ParseUnitError {
                kind: "time format",
                value: value.to_string(),
            })
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rejected query parameter, reported back in the 400 body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryIssue {
    pub key: String,
    pub message: String,
}

impl QueryIssue {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Query preferences as requested, before `auto` is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub temperature: Preference<TemperatureUnit>,
    pub precipitation: Preference<LengthUnit>,
    pub wind_speed: Preference<SpeedUnit>,
    pub air_pressure: Preference<PressureUnit>,
    pub time_format: Preference<TimeFormat>,
    /// Always a concrete, valid language tag; `auto` is detected up front.
    pub lang: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            temperature: Preference::Auto,
            precipitation: Preference::Auto,
            wind_speed: Preference::Auto,
            air_pressure: Preference::Auto,
            time_format: Preference::Auto,
            lang: FALLBACK_LANGUAGE.to_string(),
        }
    }
}

fn parse_field<T>(
    query: &HashMap<String, String>,
    key: &str,
    options: impl Iterator<Item = &'static str>,
    issues: &mut Vec<QueryIssue>,
) -> Preference<T>
where
    T: FromStr,
{
    let Some(raw) = query.get(key) else {
        return Preference::Auto;
    };

    match raw.parse::<Preference<T>>() {
        Ok(value) => value,
        Err(_) => {
            let expected = std::iter::once(AUTO)
                .chain(options)
                .map(|option| format!("\"{}\"", option))
                .collect::<Vec<_>>()
                .join(" | ");
            issues.push(QueryIssue::new(
                key,
                format!("Invalid {}: Expected ({}) but received {:?}", key, expected, raw),
            ));
            Preference::Auto
        }
    }
}

impl Preferences {
    /// Read preferences from the query, detecting `lang=auto` (or a missing
    /// `lang`) from the `Accept-Language` header.
    ///
    /// # Errors
    ///
    /// Every invalid parameter is reported, not only the first.
    pub fn from_query(
        query: &HashMap<String, String>,
        accept_language: Option<&str>,
    ) -> Result<Self, Vec<QueryIssue>> {
        let mut issues = Vec::new();

        let temperature = parse_field(
            query,
            "temperature",
            TemperatureUnit::ALL.iter().map(TemperatureUnit::as_str),
            &mut issues,
        );
        let precipitation = parse_field(
            query,
            "precipitation",
            LengthUnit::ALL.iter().map(LengthUnit::as_str),
            &mut issues,
        );
        let wind_speed = parse_field(
            query,
            "wind_speed",
            SpeedUnit::ALL.iter().map(SpeedUnit::as_str),
            &mut issues,
        );
        let air_pressure = parse_field(
            query,
            "air_pressure",
            PressureUnit::ALL.iter().map(PressureUnit::as_str),
            &mut issues,
        );
        let time_format = parse_field(
            query,
            "time_format",
            TimeFormat::ALL.iter().map(TimeFormat::as_str),
            &mut issues,
        );

        let lang = match query.get("lang").map(String::as_str) {
            None | Some(AUTO) => detect_language(accept_language),
            Some(lang) if is_valid_language_tag(lang) => lang.to_string(),
            Some(_) => {
                issues.push(QueryIssue::new("lang", "invalid lang string specified"));
                FALLBACK_LANGUAGE.to_string()
            }
        };

        if !issues.is_empty() {
            return Err(issues);
        }

        Ok(Self {
            temperature,
            precipitation,
            wind_speed,
            air_pressure,
            time_format,
            lang,
        })
    }

    /// Replace every `auto` with the value inferred from [`Self::lang`].
    pub fn resolve(&self) -> PreferredFormats {
        let inferred = infer_preferred_formats(&self.lang);
        PreferredFormats {
            temperature: self.temperature.resolve(inferred.temperature),
            precipitation: self.precipitation.resolve(inferred.precipitation),
            wind_speed: self.wind_speed.resolve(inferred.wind_speed),
            air_pressure: self.air_pressure.resolve(inferred.air_pressure),
            time_format: self.time_format.resolve(inferred.time_format),
        }
    }
}

/// Fully resolved display formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferredFormats {
    pub temperature: TemperatureUnit,
    pub precipitation: LengthUnit,
    pub wind_speed: SpeedUnit,
    pub air_pressure: PressureUnit,
    pub time_format: TimeFormat,
}

/// First language of an `Accept-Language` header, or [`FALLBACK_LANGUAGE`].
pub fn detect_language(accept_language: Option<&str>) -> String {
    accept_language
        .map(|header| header.split(&[',', ';'][..]).next().unwrap_or_default().trim())
        .filter(|lang| is_valid_language_tag(lang))
        .unwrap_or(FALLBACK_LANGUAGE)
        .to_string()
}

fn infer_temperature(language: &str, region: &str) -> TemperatureUnit {
    if METRIC_ENGLISH_REGIONS.contains(&region) {
        return TemperatureUnit::Celsius;
    }
    if FAHRENHEIT_REGIONS.contains(&region) || language == "en" {
        return TemperatureUnit::Fahrenheit;
    }
    TemperatureUnit::Celsius
}

fn infer_precipitation(language: &str, region: &str) -> LengthUnit {
    if METRIC_ENGLISH_REGIONS.contains(&region) {
        return LengthUnit::Mm;
    }
    if INCH_REGIONS.contains(&region) || language == "en" {
        return LengthUnit::Inch;
    }
    LengthUnit::Mm
}

fn infer_wind_speed(language: &str, region: &str) -> SpeedUnit {
    match infer_precipitation(language, region) {
        LengthUnit::Inch => SpeedUnit::Mph,
        LengthUnit::Mm => SpeedUnit::Mps,
    }
}

/// Clock style of the language's short time format.
fn infer_time_format(language: &str, region: &str) -> TimeFormat {
    match language {
        // Native digits that are not ASCII
        "ar" | "fa" | "bn" | "mr" | "ne" | "my" => TimeFormat::Native,
        "ja" => TimeFormat::H24n,
        "en" if matches!(region, "GB" | "IE" | "ZA") => TimeFormat::H24,
        "en" | "ko" | "hi" => TimeFormat::H12,
        "zh" if matches!(region, "TW" | "HK" | "MO") => TimeFormat::H12,
        _ => TimeFormat::H24,
    }
}

/// Formats a reader of `language` most likely expects.
pub fn infer_preferred_formats(language: &str) -> PreferredFormats {
    let (language_code, region_code) = match language.parse::<LanguageIdentifier>() {
        Ok(id) => (
            id.language.as_str().to_ascii_lowercase(),
            id.region
                .map(|region| region.as_str().to_ascii_uppercase())
                .unwrap_or_default(),
        ),
        Err(_) => (String::new(), String::new()),
    };
    let (language_code, region_code) = (language_code.as_str(), region_code.as_str());

    PreferredFormats {
        temperature: infer_temperature(language_code, region_code),
        precipitation: infer_precipitation(language_code, region_code),
        wind_speed: infer_wind_speed(language_code, region_code),
        air_pressure: PressureUnit::Hpa,
        time_format: infer_time_format(language_code, region_code),
    }
}
