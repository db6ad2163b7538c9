//! End-to-end tests for location tokens: encrypt with the derived public key,
//! resolve with the private key.

use weathersvg_location::{
    codec::{decode_base64url, encode_base64url},
    derive_public_key, encrypt_location, generate_private_jwk, import_private_key,
    resolve_location, LocationParam, PlainLocation, ResolvedLocation,
};

const PRIVATE_JWK: &str = include_str!("fixtures/private_key.jwk.json");
const OTHER_PRIVATE_JWK: &str = include_str!("fixtures/other_private_key.jwk.json");

fn encrypted(token: String) -> LocationParam {
    LocationParam::Encrypted {
        encrypted_location: token,
    }
}

#[test]
fn test_roundtrip_for_valid_locations() {
    let private = import_private_key(PRIVATE_JWK).unwrap();
    let public = derive_public_key(PRIVATE_JWK).unwrap();

    let locations = [
        PlainLocation::new("35.0", "139.0"),
        PlainLocation::new("-90", "180"),
        PlainLocation::new("+0.000001", "-179.999999"),
        PlainLocation::new("35.698683", "139.774219").with_name("千代田区", "ja-JP"),
        PlainLocation::new("31.7683", "35.2137").with_name("ירושלים", "he"),
    ];

    for location in locations {
        let token = encrypt_location(&location, &public).unwrap();
        let resolved = resolve_location(&encrypted(token), &private);
        assert_eq!(
            resolved,
            Some(ResolvedLocation {
                location,
                encrypted: true,
            })
        );
    }
}

#[test]
fn test_fresh_keypair_end_to_end() {
    let private_jwk = generate_private_jwk(2048).unwrap();
    let private = import_private_key(&private_jwk).unwrap();
    let public = derive_public_key(&private_jwk).unwrap();

    let location = PlainLocation::new("35.0", "139.0");
    let token = encrypt_location(&location, &public).unwrap();

    let resolved = resolve_location(&encrypted(token), &private).unwrap();
    assert_eq!(resolved.location, location);
    assert!(resolved.encrypted);
}

#[test]
fn test_flipped_bytes_are_rejected() {
    let private = import_private_key(PRIVATE_JWK).unwrap();
    let public = derive_public_key(PRIVATE_JWK).unwrap();
    let token = encrypt_location(&PlainLocation::new("35.0", "139.0"), &public).unwrap();
    let bytes = decode_base64url(&token).unwrap();

    for index in [0, 1, bytes.len() / 2, bytes.len() - 2, bytes.len() - 1] {
        let mut tampered = bytes.clone();
        tampered[index] ^= 0x01;
        let param = encrypted(encode_base64url(&tampered));
        assert!(
            resolve_location(&param, &private).is_none(),
            "byte {} flip was accepted",
            index
        );
    }
}

#[test]
fn test_truncated_tokens_are_rejected() {
    let private = import_private_key(PRIVATE_JWK).unwrap();
    let public = derive_public_key(PRIVATE_JWK).unwrap();
    let token = encrypt_location(&PlainLocation::new("35.0", "139.0"), &public).unwrap();

    for len in [0, 1, token.len() / 2, token.len() - 1] {
        let param = encrypted(token[..len].to_string());
        assert!(resolve_location(&param, &private).is_none());
    }
}

#[test]
fn test_token_for_another_key_is_rejected() {
    let private = import_private_key(PRIVATE_JWK).unwrap();
    let other_public = derive_public_key(OTHER_PRIVATE_JWK).unwrap();
    let token = encrypt_location(&PlainLocation::new("35.0", "139.0"), &other_public).unwrap();

    assert!(resolve_location(&encrypted(token), &private).is_none());
}

#[test]
fn test_garbage_tokens_are_rejected() {
    let private = import_private_key(PRIVATE_JWK).unwrap();
    for token in ["", "test", "!!!", "a=b", &"A".repeat(342)] {
        assert!(resolve_location(&encrypted(token.to_string()), &private).is_none());
    }
}

#[test]
fn test_encrypted_branch_takes_precedence() {
    let private = import_private_key(PRIVATE_JWK).unwrap();
    let public = derive_public_key(PRIVATE_JWK).unwrap();
    let secret = PlainLocation::new("35.0", "139.0");
    let token = encrypt_location(&secret, &public).unwrap();

    let query = [
        ("encrypted_location", token.as_str()),
        ("latitude", "10.0"),
        ("longitude", "20.0"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let param = LocationParam::from_query(&query).unwrap();
    let resolved = resolve_location(&param, &private).unwrap();
    assert_eq!(resolved.location, secret);
    assert!(resolved.encrypted);
}
