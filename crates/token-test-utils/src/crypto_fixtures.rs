//! Deterministic cryptographic fixtures for testing
//!
//! Provides reproducible Ed25519 keypairs. All fixtures are deterministic
//! based on seed values.

use base64::engine::general_purpose;
use base64::Engine;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use ring::signature::{Ed25519KeyPair, KeyPair};
use serde_json::{Map, Value};
use thiserror::Error;
use token_service::services::key_management_service::SigningCredential;

/// Test fixture error type
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),
}

/// Generate a deterministic Ed25519 signing key for testing.
///
/// The same seed always produces the same keypair.
///
/// # Returns
/// * `Ok((public_key_pem, private_key_pkcs8))` - Public key in PEM format,
///   private key in PKCS#8 v2 DER
pub fn test_signing_key(seed: u8) -> Result<(String, Vec<u8>), FixtureError> {
    let seed_bytes = seed_bytes(seed);

    let key_pair = Ed25519KeyPair::from_seed_unchecked(&seed_bytes)
        .map_err(|e| FixtureError::Crypto(format!("Failed to generate test keypair: {:?}", e)))?;

    let mut public_key = [0u8; 32];
    public_key.copy_from_slice(key_pair.public_key().as_ref());

    let public_key_pem = format!(
        "-----BEGIN PUBLIC KEY-----\n{}\n-----END PUBLIC KEY-----",
        general_purpose::STANDARD.encode(public_key)
    );

    Ok((public_key_pem, build_pkcs8_v2(&seed_bytes, &public_key)))
}

/// Deterministic signing credential with the given key ID.
pub fn test_signing_credential(seed: u8, key_id: &str) -> Result<SigningCredential, FixtureError> {
    let (_, pkcs8) = test_signing_key(seed)?;
    SigningCredential::from_pkcs8(key_id, pkcs8).map_err(|e| FixtureError::Crypto(e.to_string()))
}

/// Raw public key bytes from a PEM produced by [`test_signing_key`], for
/// `jsonwebtoken::DecodingKey::from_ed_der`.
pub fn public_key_bytes(public_key_pem: &str) -> Result<Vec<u8>, FixtureError> {
    let b64: String = public_key_pem
        .lines()
        .filter(|line| !line.starts_with("-----"))
        .collect();
    general_purpose::STANDARD
        .decode(b64)
        .map_err(|e| FixtureError::Crypto(format!("Invalid public key PEM: {}", e)))
}

/// Verify an EdDSA token against a raw public key and return its claims.
///
/// Expiry is not checked: fixture clocks sit in the past.
pub fn verify_eddsa(
    token: &str,
    public_key: &[u8],
    audience: &str,
) -> Result<Map<String, Value>, jsonwebtoken::errors::Error> {
    let validation = fixture_validation(Algorithm::EdDSA, audience);
    decode::<Map<String, Value>>(token, &DecodingKey::from_ed_der(public_key), &validation)
        .map(|data| data.claims)
}

/// Verify an HS256 token against a client secret and return its claims.
///
/// Expiry is not checked: fixture clocks sit in the past.
pub fn verify_hs256(
    token: &str,
    secret: &str,
    audience: &str,
) -> Result<Map<String, Value>, jsonwebtoken::errors::Error> {
    let validation = fixture_validation(Algorithm::HS256, audience);
    decode::<Map<String, Value>>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

fn fixture_validation(alg: Algorithm, audience: &str) -> Validation {
    let mut validation = Validation::new(alg);
    validation.validate_exp = false;
    validation.set_audience(&[audience]);
    validation
}

fn seed_bytes(seed: u8) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[0] = seed;
    for (i, byte) in bytes.iter_mut().enumerate().skip(1) {
        *byte = seed.wrapping_mul(i as u8).wrapping_add(i as u8);
    }
    bytes
}

/// Build a PKCS#8 v2 (RFC 5958) document for an Ed25519 seed.
///
/// ring's `Ed25519KeyPair::from_pkcs8` only accepts v2, which carries the
/// public key alongside the seed.
fn build_pkcs8_v2(seed: &[u8; 32], public_key: &[u8; 32]) -> Vec<u8> {
    let mut pkcs8 = Vec::with_capacity(85);

    // OneAsymmetricKey SEQUENCE, 83 bytes
    pkcs8.extend_from_slice(&[0x30, 0x53]);
    // version INTEGER 1 (v2)
    pkcs8.extend_from_slice(&[0x02, 0x01, 0x01]);
    // AlgorithmIdentifier { OID 1.3.101.112 }
    pkcs8.extend_from_slice(&[0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70]);
    // privateKey OCTET STRING { OCTET STRING seed }
    pkcs8.extend_from_slice(&[0x04, 0x22, 0x04, 0x20]);
    pkcs8.extend_from_slice(seed);
    // [1] publicKey BIT STRING
    pkcs8.extend_from_slice(&[0xa1, 0x23, 0x03, 0x21, 0x00]);
    pkcs8.extend_from_slice(public_key);

    pkcs8
}
