//! HTTP surface for weather.svg
//!
//! Serves the rendered widget at `/weather.svg` and the location public key
//! at `/public-key.json`.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, NO_CACHE};
pub use routes::routes;
pub use state::AppState;
