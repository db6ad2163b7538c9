//! Request handlers for the widget and the public key.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use warp::http::header::{HeaderValue, CACHE_CONTROL, CONTENT_TYPE, LOCATION, VARY};
use warp::http::StatusCode;
use warp::hyper::Body;
use warp::reply::Response;
use warp::Reply;
use weathersvg_core::{AppError, KeyError, UpstreamError};
use weathersvg_location::{
    encrypt_location, resolve_location, LocationParam, PlainLocation, ValidationError,
};
use weathersvg_widget::{
    render_weather_widget, Preferences, QueryIssue, WidgetInput, CREDIT_BIG_DATA_CLOUD,
    CREDIT_METEOCONS, CREDIT_OPEN_METEO,
};

use crate::error::{error_response, ApiError, NO_CACHE};
use crate::state::AppState;

const SVG_CONTENT_TYPE: &str = "image/svg+xml; charset=UTF-8";

/// Query keys replaced by `encrypted_location` when redirecting.
const PLAIN_LOCATION_KEYS: [&str; 5] = ["latitude", "longitude", "location", "location_lang", "encrypt"];

/// `GET /weather.svg`
pub async fn weather_svg(
    query: HashMap<String, String>,
    raw_query: String,
    accept_language: Option<String>,
    state: Arc<AppState>,
) -> Result<Response, Infallible> {
    let response = render(&query, &raw_query, accept_language.as_deref(), &state)
        .await
        .unwrap_or_else(ApiError::into_response);
    Ok(response)
}

/// `GET /public-key.json`
pub async fn public_key(state: Arc<AppState>) -> Result<Response, Infallible> {
    let response = match state.public_key.get() {
        Ok(key) => {
            let mut response = warp::reply::json(&key.to_jwk()).into_response();
            response
                .headers_mut()
                .insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
            response
        }
        Err(e) => {
            tracing::error!("Failed to derive public key: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    };
    Ok(response)
}

async fn render(
    query: &HashMap<String, String>,
    raw_query: &str,
    accept_language: Option<&str>,
    state: &AppState,
) -> Result<Response, ApiError> {
    let (preferences, param) = validate_query(query, accept_language)?;

    let resolved = resolve_location(&param, &state.private_key).ok_or(ApiError::InvalidLocation)?;
    let location = resolved.location;

    if !resolved.encrypted && query.contains_key("encrypt") {
        return encrypted_redirect(&location, raw_query, state);
    }

    let mut credits = String::new();

    let weather = state
        .weather
        .forecast(&location.latitude, &location.longitude)
        .await
        .map_err(|e| AppError::from(UpstreamError::Weather(e.to_string())))?;
    credits.push_str(CREDIT_OPEN_METEO);

    let named = |field: &Option<String>| field.as_deref().filter(|s| !s.is_empty()).map(str::to_string);
    let (label, language) = match (named(&location.name), named(&location.language)) {
        (Some(name), Some(language)) => (name, language),
        _ => {
            let geocoding = state
                .weather
                .reverse_geocode(&location.latitude, &location.longitude, &preferences.lang)
                .await
                .map_err(|e| AppError::from(UpstreamError::Geocoding(e.to_string())))?;
            credits.push_str(CREDIT_BIG_DATA_CLOUD);
            (geocoding.locality, geocoding.locality_language_requested)
        }
    };

    credits.push_str(CREDIT_METEOCONS);

    let input = WidgetInput {
        weather: &weather,
        preferences: &preferences,
        location_label: &label,
        location_language: &language,
        comment_credits: &credits,
    };
    let mut svg = render_weather_widget(&input, &state.icons, state.render_mode)
        .map_err(|e| AppError::Other(anyhow::anyhow!("Failed to render widget: {}", e)))?;
    svg.push('\n');

    let mut response = Response::new(Body::from(svg));
    let headers = response.headers_mut();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(SVG_CONTENT_TYPE));
    headers.insert(VARY, HeaderValue::from_static("Accept-Language"));
    Ok(response)
}

/// Parse preferences and the location shape, reporting every issue at once.
fn validate_query(
    query: &HashMap<String, String>,
    accept_language: Option<&str>,
) -> Result<(Preferences, LocationParam), ApiError> {
    match (
        Preferences::from_query(query, accept_language),
        LocationParam::from_query(query),
    ) {
        (Ok(preferences), Ok(param)) => Ok((preferences, param)),
        (preferences, param) => {
            let mut issues = preferences.err().unwrap_or_default();
            if let Err(e) = param {
                issues.push(location_issue(&e));
            }
            Err(ApiError::InvalidQuery(issues))
        }
    }
}

fn location_issue(error: &ValidationError) -> QueryIssue {
    let key = match error {
        ValidationError::NotAString(field) | ValidationError::Missing(field) => *field,
        ValidationError::InvalidLatitude => "latitude",
        ValidationError::InvalidLongitude => "longitude",
        ValidationError::InvalidLanguage => "location_lang",
        ValidationError::NotAnObject | ValidationError::NamePairMismatch => "location",
    };
    QueryIssue::new(key, error.to_string())
}

/// 302 to the same query with the plain location swapped for a token.
///
/// The redirect is temporary because encryption is randomized: the same
/// location never yields the same token twice.
fn encrypted_redirect(
    location: &PlainLocation,
    raw_query: &str,
    state: &AppState,
) -> Result<Response, ApiError> {
    let public_key = state
        .public_key
        .get()
        .map_err(|e| AppError::from(KeyError::Import(e.to_string())))?;
    let token = encrypt_location(location, &public_key)
        .map_err(|e| AppError::Other(anyhow::anyhow!("Failed to encrypt location: {}", e)))?;

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in url::form_urlencoded::parse(raw_query.as_bytes()) {
        if PLAIN_LOCATION_KEYS.contains(&key.as_ref()) || key == "encrypted_location" {
            continue;
        }
        serializer.append_pair(&key, &value);
    }
    serializer.append_pair("encrypted_location", &token);

    let target = format!("/weather.svg?{}", serializer.finish());
    let target = HeaderValue::from_str(&target)
        .map_err(|e| AppError::Other(anyhow::anyhow!("Invalid redirect target: {}", e)))?;

    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::FOUND;
    response.headers_mut().insert(LOCATION, target);
    Ok(response)
}
