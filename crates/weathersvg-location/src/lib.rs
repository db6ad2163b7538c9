//! Location tokens for weather.svg
//!
//! Lets a widget URL carry an opaque, RSA-encrypted location instead of
//! plaintext coordinates, and resolves either form back to a validated
//! [`PlainLocation`].

pub mod cipher;
pub mod codec;
pub mod error;
pub mod key_cache;
pub mod resolve;
pub mod schema;

pub use cipher::{
    decrypt_location, derive_public_key, encrypt_location, generate_private_jwk,
    import_private_key, LocationPrivateKey, LocationPublicKey, PublicJwk,
};
pub use error::{DecryptionError, EncryptionError, KeyImportError, ValidationError};
pub use key_cache::PublicKeyCache;
pub use resolve::{resolve_location, ResolvedLocation};
pub use schema::{is_valid_language_tag, LocationParam, PlainLocation};
