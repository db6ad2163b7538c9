use crate::cipher::{decrypt_location, LocationPrivateKey};
use crate::error::{DecryptionError, ValidationError};
use crate::schema::{LocationParam, PlainLocation};

/// A location recovered from a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub location: PlainLocation,
    /// Whether the location arrived as an encrypted token.
    pub encrypted: bool,
}

#[derive(Debug, thiserror::Error)]
enum RejectReason {
    #[error(transparent)]
    Decryption(#[from] DecryptionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Recover the canonical location for a request.
///
/// Every failure yields `None`. Whether a token failed to decrypt or
/// decrypted to an out-of-range location is only visible in debug logs.
pub fn resolve_location(
    param: &LocationParam,
    private_key: &LocationPrivateKey,
) -> Option<ResolvedLocation> {
    match try_resolve(param, private_key) {
        Ok(resolved) => Some(resolved),
        Err(reason) => {
            tracing::debug!("Rejected location: {}", reason);
            None
        }
    }
}

fn try_resolve(
    param: &LocationParam,
    private_key: &LocationPrivateKey,
) -> Result<ResolvedLocation, RejectReason> {
    match param {
        LocationParam::Encrypted { encrypted_location } => {
            let candidate = decrypt_location(encrypted_location, private_key)?;
            Ok(ResolvedLocation {
                location: PlainLocation::from_value(&candidate)?,
                encrypted: true,
            })
        }
        LocationParam::Plain(location) => {
            location.validate()?;
            Ok(ResolvedLocation {
                location: location.clone(),
                encrypted: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{derive_public_key, encrypt_location, import_private_key};

    const PRIVATE_JWK: &str = include_str!("../tests/fixtures/private_key.jwk.json");

    #[test]
    fn test_plain_location_passes_through() {
        let key = import_private_key(PRIVATE_JWK).unwrap();
        let location = PlainLocation::new("40.0", "140.0");
        let resolved = resolve_location(&LocationParam::Plain(location.clone()), &key).unwrap();
        assert_eq!(resolved.location, location);
        assert!(!resolved.encrypted);
    }

    #[test]
    fn test_invalid_plain_location_is_rejected() {
        let key = import_private_key(PRIVATE_JWK).unwrap();
        // Bypasses from_query, so resolution must validate on its own
        let location = PlainLocation {
            latitude: "40.0".into(),
            longitude: "140.0".into(),
            name: Some("Somewhere".into()),
            language: None,
        };
        assert!(resolve_location(&LocationParam::Plain(location), &key).is_none());
    }

    #[test]
    fn test_encrypted_out_of_range_is_rejected() {
        let key = import_private_key(PRIVATE_JWK).unwrap();
        let public = derive_public_key(PRIVATE_JWK).unwrap();
        let token = encrypt_location(&PlainLocation::new("91", "0"), &public).unwrap();

        let param = LocationParam::Encrypted {
            encrypted_location: token,
        };
        assert!(resolve_location(&param, &key).is_none());
    }
}
