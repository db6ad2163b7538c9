//! Location token error types.
//!
//! These carry detail for logs. Callers of [`crate::resolve_location`] never
//! see them; resolution collapses every failure into `None`.

use thiserror::Error;

/// Malformed or incompatible key material.
#[derive(Debug, Error)]
pub enum KeyImportError {
    #[error("Key record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("Unsupported key algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Key record does not permit {0}")]
    OperationNotPermitted(&'static str),

    #[error("Missing key field: {0}")]
    MissingField(&'static str),

    #[error("Key field {field} is not base64url: {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Key material rejected: {0}")]
    Rsa(#[from] rsa::Error),
}

/// Failure anywhere between an opaque token and its JSON payload.
#[derive(Debug, Error)]
pub enum DecryptionError {
    #[error("Token is not base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Token does not decrypt: {0}")]
    Cipher(#[from] rsa::Error),

    #[error("Payload does not decompress: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("Payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure producing a token from a location record.
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("Location does not serialize: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Location does not compress: {0}")]
    Compress(#[source] std::io::Error),

    #[error("Location does not encrypt: {0}")]
    Cipher(#[from] rsa::Error),
}

/// Schema mismatch on plain or decrypted location data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("location must be an object")]
    NotAnObject,

    #[error("{0} must be a string")]
    NotAString(&'static str),

    #[error("{0} is required")]
    Missing(&'static str),

    #[error("latitude must be a valid latitude")]
    InvalidLatitude,

    #[error("longitude must be a valid longitude")]
    InvalidLongitude,

    #[error("invalid location_lang string specified")]
    InvalidLanguage,

    #[error("location and location_lang must be both present or both absent")]
    NamePairMismatch,
}
