//! RSA-OAEP (SHA-256) location tokens.
//!
//! Token layout: `base64url(rsa_oaep(deflate_raw(utf8(json(location)))))`,
//! unpadded. OAEP is randomized, so the same location encrypts to a
//! different token every time.

use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, Oaep, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;

use crate::codec::{compress_raw, decode_base64url, decompress_raw, encode_base64url};
use crate::error::{DecryptionError, EncryptionError, KeyImportError};
use crate::schema::PlainLocation;

/// JWK `alg` for RSA-OAEP with SHA-256.
pub const JWK_ALGORITHM: &str = "RSA-OAEP-256";

const PUBLIC_EXPONENT: u32 = 65537;

/// The subset of a private JWK record we read.
#[derive(Debug, Deserialize)]
struct PrivateJwkRecord {
    kty: String,
    #[serde(default)]
    alg: Option<String>,
    #[serde(default)]
    key_ops: Option<Vec<String>>,
    n: String,
    e: String,
    #[serde(default)]
    d: Option<String>,
    #[serde(default)]
    p: Option<String>,
    #[serde(default)]
    q: Option<String>,
}

impl PrivateJwkRecord {
    fn parse(serialized: &str) -> Result<Self, KeyImportError> {
        let record: Self = serde_json::from_str(serialized)?;
        if record.kty != "RSA" {
            return Err(KeyImportError::UnsupportedKeyType(record.kty));
        }
        if let Some(alg) = &record.alg {
            if alg != JWK_ALGORITHM {
                return Err(KeyImportError::UnsupportedAlgorithm(alg.clone()));
            }
        }
        Ok(record)
    }
}

fn decode_uint(field: &'static str, value: &str) -> Result<BigUint, KeyImportError> {
    let bytes =
        decode_base64url(value).map_err(|source| KeyImportError::InvalidField { field, source })?;
    Ok(BigUint::from_bytes_be(&bytes))
}

fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str, KeyImportError> {
    value.as_deref().ok_or(KeyImportError::MissingField(field))
}

/// Decrypt-only private key.
///
/// There is deliberately no way to get the key material back out.
pub struct LocationPrivateKey {
    key: RsaPrivateKey,
}

impl LocationPrivateKey {
    /// Import a serialized private JWK.
    pub fn import(serialized: &str) -> Result<Self, KeyImportError> {
        let record = PrivateJwkRecord::parse(serialized)?;
        if let Some(ops) = &record.key_ops {
            if !ops.iter().any(|op| op == "decrypt") {
                return Err(KeyImportError::OperationNotPermitted("decrypt"));
            }
        }

        let n = decode_uint("n", &record.n)?;
        let e = decode_uint("e", &record.e)?;
        let d = decode_uint("d", required("d", &record.d)?)?;
        let p = decode_uint("p", required("p", &record.p)?)?;
        let q = decode_uint("q", required("q", &record.q)?)?;

        let key = RsaPrivateKey::from_components(n, e, d, vec![p, q])?;
        key.validate()?;

        tracing::debug!("Imported {}-bit location private key", key.size() * 8);
        Ok(Self { key })
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, rsa::Error> {
        self.key.decrypt(Oaep::new::<Sha256>(), ciphertext)
    }
}

impl std::fmt::Debug for LocationPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationPrivateKey")
            .field("bits", &(self.key.size() * 8))
            .finish_non_exhaustive()
    }
}

/// Public JWK as served to clients that want to mint tokens themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicJwk {
    pub key_ops: Vec<String>,
    pub kty: String,
    pub n: String,
    pub e: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    pub ext: bool,
}

/// Encrypt-only public key derived from the private record.
#[derive(Debug, Clone)]
pub struct LocationPublicKey {
    key: RsaPublicKey,
    jwk: PublicJwk,
}

impl LocationPublicKey {
    /// Derive the public half from a serialized private JWK.
    ///
    /// Only `kty`, `alg`, `n` and `e` are read, so this is pure and cheap
    /// enough to repeat, but see [`crate::PublicKeyCache`].
    pub fn derive(serialized_private: &str) -> Result<Self, KeyImportError> {
        let record = PrivateJwkRecord::parse(serialized_private)?;
        let key = RsaPublicKey::new(decode_uint("n", &record.n)?, decode_uint("e", &record.e)?)?;

        let jwk = PublicJwk {
            key_ops: vec!["encrypt".to_string()],
            kty: record.kty,
            n: record.n,
            e: record.e,
            alg: record.alg,
            ext: true,
        };

        Ok(Self { key, jwk })
    }

    /// Export as a JWK restricted to `encrypt`.
    pub fn to_jwk(&self) -> PublicJwk {
        self.jwk.clone()
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, rsa::Error> {
        self.key
            .encrypt(&mut rand::thread_rng(), Oaep::new::<Sha256>(), plaintext)
    }
}

/// Import a decrypt-only private key from a serialized JWK.
pub fn import_private_key(serialized: &str) -> Result<LocationPrivateKey, KeyImportError> {
    LocationPrivateKey::import(serialized)
}

/// Derive the encrypt-only public key from a serialized private JWK.
pub fn derive_public_key(serialized_private: &str) -> Result<LocationPublicKey, KeyImportError> {
    LocationPublicKey::derive(serialized_private)
}

/// Turn a location into an opaque token.
pub fn encrypt_location(
    location: &PlainLocation,
    public_key: &LocationPublicKey,
) -> Result<String, EncryptionError> {
    let json = serde_json::to_vec(location)?;
    let compressed = compress_raw(&json).map_err(EncryptionError::Compress)?;
    let ciphertext = public_key.encrypt(&compressed)?;
    Ok(encode_base64url(&ciphertext))
}

/// Recover the JSON payload of a token. The result is not validated.
pub fn decrypt_location(
    token: &str,
    private_key: &LocationPrivateKey,
) -> Result<Value, DecryptionError> {
    let ciphertext = decode_base64url(token)?;
    let compressed = private_key.decrypt(&ciphertext)?;
    let json = decompress_raw(&compressed).map_err(DecryptionError::Decompress)?;
    let text = String::from_utf8(json)?;
    Ok(serde_json::from_str(&text)?)
}

/// Generate a fresh keypair and serialize the private half as a JWK.
///
/// The record carries the CRT parameters so that WebCrypto can import it too.
pub fn generate_private_jwk(bits: usize) -> Result<String, rsa::Error> {
    let key = RsaPrivateKey::new_with_exp(
        &mut rand::thread_rng(),
        bits,
        &BigUint::from(PUBLIC_EXPONENT),
    )?;

    let [p, q] = match key.primes() {
        [p, q] => [p.clone(), q.clone()],
        _ => return Err(rsa::Error::InvalidPrime),
    };
    let one = BigUint::from(1u32);
    let two = BigUint::from(2u32);
    let d = key.d();
    let dp = d % &(&p - &one);
    let dq = d % &(&q - &one);
    // p is prime, so q^(p-2) is the inverse of q modulo p
    let qi = q.modpow(&(&p - &two), &p);

    let encode = |value: &BigUint| encode_base64url(&value.to_bytes_be());
    let record = serde_json::json!({
        "kty": "RSA",
        "alg": JWK_ALGORITHM,
        "n": encode(key.n()),
        "e": encode(key.e()),
        "d": encode(d),
        "p": encode(&p),
        "q": encode(&q),
        "dp": encode(&dp),
        "dq": encode(&dq),
        "qi": encode(&qi),
        "key_ops": ["decrypt"],
        "ext": false,
    });

    Ok(record.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE_JWK: &str = include_str!("../tests/fixtures/private_key.jwk.json");

    #[test]
    fn test_import_fixture() {
        let key = LocationPrivateKey::import(PRIVATE_JWK).unwrap();
        assert!(format!("{:?}", key).contains("2048"));
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        assert!(matches!(
            LocationPrivateKey::import("{"),
            Err(KeyImportError::Json(_))
        ));
    }

    #[test]
    fn test_import_rejects_other_key_types() {
        let err = LocationPrivateKey::import(r#"{"kty":"EC","n":"AQAB","e":"AQAB"}"#).unwrap_err();
        assert!(matches!(err, KeyImportError::UnsupportedKeyType(kty) if kty == "EC"));
    }

    #[test]
    fn test_import_rejects_public_record() {
        let public = serde_json::to_string(&derive_public_key(PRIVATE_JWK).unwrap().to_jwk()).unwrap();
        assert!(matches!(
            LocationPrivateKey::import(&public),
            Err(KeyImportError::OperationNotPermitted("decrypt"))
        ));
    }

    #[test]
    fn test_import_rejects_mismatched_components() {
        let mut record: serde_json::Value = serde_json::from_str(PRIVATE_JWK).unwrap();
        record["d"] = serde_json::Value::String("AQAB".to_string());
        assert!(LocationPrivateKey::import(&record.to_string()).is_err());
    }

    #[test]
    fn test_derived_public_jwk() {
        let private: serde_json::Value = serde_json::from_str(PRIVATE_JWK).unwrap();
        let jwk = derive_public_key(PRIVATE_JWK).unwrap().to_jwk();

        assert_eq!(jwk.key_ops, vec!["encrypt".to_string()]);
        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.alg.as_deref(), Some(JWK_ALGORITHM));
        assert!(jwk.ext);
        assert_eq!(jwk.n, private["n"].as_str().unwrap());
        assert_eq!(jwk.e, private["e"].as_str().unwrap());

        let exported = serde_json::to_value(&jwk).unwrap();
        assert!(exported.get("d").is_none());
        assert!(exported.get("p").is_none());
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let a = derive_public_key(PRIVATE_JWK).unwrap().to_jwk();
        let b = derive_public_key(PRIVATE_JWK).unwrap().to_jwk();
        assert_eq!(a, b);
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let private = import_private_key(PRIVATE_JWK).unwrap();
        let public = derive_public_key(PRIVATE_JWK).unwrap();
        let location = PlainLocation::new("35.0", "139.0").with_name("Chiyoda", "ja-JP");

        let token = encrypt_location(&location, &public).unwrap();
        assert!(!token.contains('='));
        assert!(!token.contains('+') && !token.contains('/'));

        let value = decrypt_location(&token, &private).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "latitude": "35.0",
                "longitude": "139.0",
                "location": "Chiyoda",
                "location_lang": "ja-JP",
            })
        );
    }

    #[test]
    fn test_tokens_are_randomized() {
        let public = derive_public_key(PRIVATE_JWK).unwrap();
        let location = PlainLocation::new("35.0", "139.0");
        let a = encrypt_location(&location, &public).unwrap();
        let b = encrypt_location(&location, &public).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_decrypt_rejects_bad_encoding() {
        let private = import_private_key(PRIVATE_JWK).unwrap();
        assert!(matches!(
            decrypt_location("***", &private),
            Err(DecryptionError::Encoding(_))
        ));
    }

    #[test]
    fn test_decrypt_rejects_wrong_length() {
        let private = import_private_key(PRIVATE_JWK).unwrap();
        let short = encode_base64url(&[7u8; 16]);
        assert!(matches!(
            decrypt_location(&short, &private),
            Err(DecryptionError::Cipher(_))
        ));
    }

    #[test]
    fn test_decrypt_rejects_non_json_payload() {
        let private = import_private_key(PRIVATE_JWK).unwrap();
        let public = derive_public_key(PRIVATE_JWK).unwrap();
        let compressed = compress_raw(b"latitude=35").unwrap();
        let token = encode_base64url(&public.encrypt(&compressed).unwrap());
        assert!(matches!(
            decrypt_location(&token, &private),
            Err(DecryptionError::Json(_))
        ));
    }
}
