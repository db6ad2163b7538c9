//! Request failures and the JSON bodies they turn into.

use serde::Serialize;
use thiserror::Error;
use warp::http::header::{HeaderValue, CACHE_CONTROL};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Reply;
use weathersvg_core::AppError;
use weathersvg_widget::QueryIssue;

/// `Cache-Control` for every response: widgets embed the current time.
pub const NO_CACHE: &str = "private, max-age=0, no-cache, no-store";

/// Why a request produced no widget.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid query parameters")]
    InvalidQuery(Vec<QueryIssue>),

    #[error("Invalid location")]
    InvalidLocation,

    #[error(transparent)]
    App(#[from] AppError),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<&'a [QueryIssue]>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidQuery(_) | ApiError::InvalidLocation => StatusCode::BAD_REQUEST,
            ApiError::App(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response(self) -> Response {
        match &self {
            ApiError::InvalidQuery(issues) => error_reply(
                self.status(),
                ErrorBody {
                    error: "Invalid query parameters",
                    issues: Some(issues),
                },
            ),
            ApiError::InvalidLocation => error_reply(
                self.status(),
                ErrorBody {
                    error: "Invalid location",
                    issues: None,
                },
            ),
            ApiError::App(e) => {
                tracing::error!("Request failed: {}", e);
                error_reply(
                    self.status(),
                    ErrorBody {
                        error: e.user_message(),
                        issues: None,
                    },
                )
            }
        }
    }
}

/// A bare `{"error": message}` response.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    error_reply(
        status,
        ErrorBody {
            error: message,
            issues: None,
        },
    )
}

fn error_reply(status: StatusCode, body: ErrorBody<'_>) -> Response {
    let mut response = warp::reply::with_status(warp::reply::json(&body), status).into_response();
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
    response
}
