use std::sync::Arc;

use parking_lot::RwLock;

use crate::cipher::LocationPublicKey;
use crate::error::KeyImportError;

/// Lazily derived public key, owned by whoever owns the private JWK.
///
/// Derivation is deterministic, so the first successful result is kept for
/// the lifetime of the cache. Failures are not cached.
pub struct PublicKeyCache {
    private_jwk: Arc<str>,
    derived: RwLock<Option<Arc<LocationPublicKey>>>,
}

impl PublicKeyCache {
    pub fn new(private_jwk: impl Into<Arc<str>>) -> Self {
        Self {
            private_jwk: private_jwk.into(),
            derived: RwLock::new(None),
        }
    }

    /// Return the derived key, deriving it on first use.
    pub fn get(&self) -> Result<Arc<LocationPublicKey>, KeyImportError> {
        if let Some(key) = self.derived.read().as_ref() {
            return Ok(Arc::clone(key));
        }

        let mut slot = self.derived.write();
        if let Some(key) = slot.as_ref() {
            return Ok(Arc::clone(key));
        }

        let key = Arc::new(LocationPublicKey::derive(&self.private_jwk)?);
        tracing::debug!("Derived location public key");
        *slot = Some(Arc::clone(&key));
        Ok(key)
    }
}

impl std::fmt::Debug for PublicKeyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKeyCache")
            .field("derived", &self.derived.read().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE_JWK: &str = include_str!("../tests/fixtures/private_key.jwk.json");

    #[test]
    fn test_returns_same_instance() {
        let cache = PublicKeyCache::new(PRIVATE_JWK);
        let a = cache.get().unwrap();
        let b = cache.get().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_failure_is_not_cached() {
        let cache = PublicKeyCache::new("{}");
        assert!(cache.get().is_err());
        assert!(cache.get().is_err());
        assert!(format!("{:?}", cache).contains("derived: false"));
    }
}
