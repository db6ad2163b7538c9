//! Location record schema and request parameter shapes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use unic_langid::LanguageIdentifier;

use crate::error::ValidationError;

/// A validated plaintext location.
///
/// `name` and `language` are either both set or both unset. Coordinates are
/// kept as the caller wrote them so they round-trip byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainLocation {
    pub latitude: String,
    pub longitude: String,
    #[serde(rename = "location", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "location_lang", default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl PlainLocation {
    /// Build a location from coordinates only.
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
            name: None,
            language: None,
        }
    }

    /// Attach a display name and the language it is written in.
    pub fn with_name(mut self, name: impl Into<String>, language: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self.language = Some(language.into());
        self
    }

    /// Validate an untyped candidate (e.g. a decrypted payload).
    ///
    /// Unknown keys are ignored; `null` counts as absent for the optional fields.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let object = value.as_object().ok_or(ValidationError::NotAnObject)?;

        let location = Self {
            latitude: required_string(object, "latitude")?,
            longitude: required_string(object, "longitude")?,
            name: optional_string(object, "location")?,
            language: optional_string(object, "location_lang")?,
        };
        location.validate()?;
        Ok(location)
    }

    /// Check coordinate ranges, the language tag and name/language co-presence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_valid_latitude(&self.latitude) {
            return Err(ValidationError::InvalidLatitude);
        }
        if !is_valid_longitude(&self.longitude) {
            return Err(ValidationError::InvalidLongitude);
        }
        if let Some(language) = &self.language {
            if !is_valid_language_tag(language) {
                return Err(ValidationError::InvalidLanguage);
            }
        }
        if self.name.is_some() != self.language.is_some() {
            return Err(ValidationError::NamePairMismatch);
        }
        Ok(())
    }
}

fn required_string(object: &Map<String, Value>, key: &'static str) -> Result<String, ValidationError> {
    match object.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(ValidationError::Missing(key)),
        Some(_) => Err(ValidationError::NotAString(key)),
    }
}

fn optional_string(
    object: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<String>, ValidationError> {
    match object.get(key) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(ValidationError::NotAString(key)),
    }
}

/// Location as supplied on a request, before resolution.
///
/// The encrypted form wins whenever `encrypted_location` is present, no matter
/// which plain fields accompany it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationParam {
    Encrypted { encrypted_location: String },
    Plain(PlainLocation),
}

impl LocationParam {
    /// Query keys that describe a location; everything else is a preference.
    pub const QUERY_KEYS: [&'static str; 5] = [
        "encrypted_location",
        "latitude",
        "longitude",
        "location",
        "location_lang",
    ];

    /// Parse the location part of a query string.
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, ValidationError> {
        if let Some(token) = query.get("encrypted_location") {
            return Ok(Self::Encrypted {
                encrypted_location: token.clone(),
            });
        }

        let location = PlainLocation {
            latitude: query
                .get("latitude")
                .cloned()
                .ok_or(ValidationError::Missing("latitude"))?,
            longitude: query
                .get("longitude")
                .cloned()
                .ok_or(ValidationError::Missing("longitude"))?,
            name: query.get("location").cloned(),
            language: query.get("location_lang").cloned(),
        };
        location.validate()?;
        Ok(Self::Plain(location))
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::Encrypted { .. })
    }
}

/// Parse a signed decimal such as `-35.5`, `+139` or `12.`.
///
/// Exponents, hex and bare fractions (`.5`) are rejected.
fn parse_decimal(decimal: &str) -> Option<f64> {
    let digits = decimal.strip_prefix(&['+', '-'][..]).unwrap_or(decimal);
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (digits, ""),
    };

    if integer.is_empty()
        || !integer.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    decimal.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn is_valid_latitude(latitude: &str) -> bool {
    parse_decimal(latitude).is_some_and(|v| (-90.0..=90.0).contains(&v))
}

pub fn is_valid_longitude(longitude: &str) -> bool {
    parse_decimal(longitude).is_some_and(|v| (-180.0..=180.0).contains(&v))
}

/// A BCP-47 tag with a concrete primary language (`und` is rejected).
pub fn is_valid_language_tag(tag: &str) -> bool {
    tag.parse::<LanguageIdentifier>()
        .map(|id| !id.language.is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_decimal_pattern() {
        assert_eq!(parse_decimal("40.0"), Some(40.0));
        assert_eq!(parse_decimal("+140"), Some(140.0));
        assert_eq!(parse_decimal("-35."), Some(-35.0));
        assert_eq!(parse_decimal(".5"), None);
        assert_eq!(parse_decimal("1e2"), None);
        assert_eq!(parse_decimal("0x10"), None);
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("-"), None);
        assert_eq!(parse_decimal(" 1"), None);
    }

    #[test]
    fn test_coordinate_ranges() {
        assert!(is_valid_latitude("90"));
        assert!(is_valid_latitude("-90.0"));
        assert!(!is_valid_latitude("90.0001"));
        assert!(is_valid_longitude("-180"));
        assert!(!is_valid_longitude("180.5"));
        assert!(!is_valid_longitude("east"));
    }

    #[test]
    fn test_language_tags() {
        assert!(is_valid_language_tag("en-US"));
        assert!(is_valid_language_tag("ja"));
        assert!(is_valid_language_tag("zh-Hant-TW"));
        assert!(!is_valid_language_tag("und"));
        assert!(!is_valid_language_tag(""));
        assert!(!is_valid_language_tag("not a tag"));
    }

    #[test]
    fn test_prefers_encrypted_location() {
        let param = LocationParam::from_query(&query(&[
            ("encrypted_location", "test"),
            ("latitude", "40.0"),
            ("longitude", "140.0"),
            ("location", "test_name"),
            ("location_lang", "en-US"),
        ]))
        .unwrap();
        assert_eq!(
            param,
            LocationParam::Encrypted {
                encrypted_location: "test".into()
            }
        );

        // Incomplete plain fields do not matter either
        let param = LocationParam::from_query(&query(&[
            ("encrypted_location", "test"),
            ("latitude", "40.0"),
        ]))
        .unwrap();
        assert!(param.is_encrypted());
    }

    #[test]
    fn test_parses_latitude_and_longitude() {
        let param =
            LocationParam::from_query(&query(&[("latitude", "40.0"), ("longitude", "140.0")]))
                .unwrap();
        assert_eq!(param, LocationParam::Plain(PlainLocation::new("40.0", "140.0")));
    }

    #[test]
    fn test_accepts_optional_name() {
        let param = LocationParam::from_query(&query(&[
            ("latitude", "40.0"),
            ("longitude", "140.0"),
            ("location", "test_name"),
            ("location_lang", "en-US"),
        ]))
        .unwrap();
        assert_eq!(
            param,
            LocationParam::Plain(PlainLocation::new("40.0", "140.0").with_name("test_name", "en-US"))
        );
    }

    #[test]
    fn test_name_without_language_fails() {
        let err = LocationParam::from_query(&query(&[
            ("latitude", "40.0"),
            ("longitude", "140.0"),
            ("location", "test_name"),
        ]))
        .unwrap_err();
        assert_eq!(err, ValidationError::NamePairMismatch);
    }

    #[test]
    fn test_language_without_name_fails() {
        let err = LocationParam::from_query(&query(&[
            ("latitude", "40.0"),
            ("longitude", "140.0"),
            ("location_lang", "en-US"),
        ]))
        .unwrap_err();
        assert_eq!(err, ValidationError::NamePairMismatch);
    }

    #[test]
    fn test_missing_coordinates() {
        let err = LocationParam::from_query(&query(&[("latitude", "40.0")])).unwrap_err();
        assert_eq!(err, ValidationError::Missing("longitude"));
    }

    #[test]
    fn test_from_value_ignores_unknown_keys_and_nulls() {
        let location = PlainLocation::from_value(&json!({
            "latitude": "35.0",
            "longitude": "139.0",
            "location": null,
            "extra": 1,
        }))
        .unwrap();
        assert_eq!(location, PlainLocation::new("35.0", "139.0"));
    }

    #[test]
    fn test_from_value_rejects_wrong_types() {
        assert_eq!(
            PlainLocation::from_value(&json!(["35.0", "139.0"])),
            Err(ValidationError::NotAnObject)
        );
        assert_eq!(
            PlainLocation::from_value(&json!({"latitude": 35.0, "longitude": "139.0"})),
            Err(ValidationError::NotAString("latitude"))
        );
        assert_eq!(
            PlainLocation::from_value(&json!({"latitude": "95", "longitude": "139.0"})),
            Err(ValidationError::InvalidLatitude)
        );
    }

    #[test]
    fn test_serialization_omits_absent_name() {
        let json = serde_json::to_string(&PlainLocation::new("35.0", "139.0")).unwrap();
        assert_eq!(json, r#"{"latitude":"35.0","longitude":"139.0"}"#);

        let json = serde_json::to_string(&PlainLocation::new("1", "2").with_name("X", "en")).unwrap();
        assert_eq!(
            json,
            r#"{"latitude":"1","longitude":"2","location":"X","location_lang":"en"}"#
        );
    }
}
