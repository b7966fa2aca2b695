use crate::errors::TokenError;
use base64::{
    engine::general_purpose::{self, URL_SAFE_NO_PAD},
    Engine as _,
};
use common::jwt::JWT_TYPE;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use ring::{
    rand::{SecureRandom, SystemRandom},
    signature::{Ed25519KeyPair, KeyPair},
};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::instrument;

/// Size of reference and refresh token handles (128 bits).
pub const HANDLE_BYTES: usize = 16;

/// Generate EdDSA (Ed25519) keypair using CSPRNG
///
/// Returns (public_key_pem, private_key_pkcs8)
#[instrument(skip_all)]
pub fn generate_signing_key() -> Result<(String, Vec<u8>), TokenError> {
    let rng = SystemRandom::new();

    let pkcs8_bytes = Ed25519KeyPair::generate_pkcs8(&rng)
        .map_err(|e| TokenError::Crypto(format!("Keypair generation failed: {}", e)))?;

    let public_key_pem = public_key_pem(pkcs8_bytes.as_ref())?;

    Ok((public_key_pem, pkcs8_bytes.as_ref().to_vec()))
}

/// PEM-wrapped raw Ed25519 public key for a PKCS#8 private key.
pub fn public_key_pem(private_key_pkcs8: &[u8]) -> Result<String, TokenError> {
    let key_pair = Ed25519KeyPair::from_pkcs8(private_key_pkcs8)
        .map_err(|e| TokenError::Crypto(format!("Keypair parsing failed: {}", e)))?;

    Ok(format!(
        "-----BEGIN PUBLIC KEY-----\n{}\n-----END PUBLIC KEY-----",
        general_purpose::STANDARD.encode(key_pair.public_key().as_ref())
    ))
}

/// Generate cryptographically secure random bytes
pub fn generate_random_bytes(len: usize) -> Result<Vec<u8>, TokenError> {
    let rng = SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|e| TokenError::Crypto(format!("Random bytes generation failed: {}", e)))?;
    Ok(bytes)
}

/// Generate an opaque token handle: 128 random bits as 32 lowercase hex chars.
///
/// Uniqueness is not checked; the store is the final authority.
pub fn generate_handle() -> Result<String, TokenError> {
    Ok(hex::encode(generate_random_bytes(HANDLE_BYTES)?))
}

/// OpenID Connect `at_hash` for an access token string.
///
/// SHA-256 over the token bytes, left half of the digest, base64url without
/// padding.
pub fn access_token_hash(access_token: &str) -> String {
    let digest = Sha256::digest(access_token.as_bytes());
    let (left_half, _) = digest.split_at(digest.len() / 2);
    URL_SAFE_NO_PAD.encode(left_half)
}

/// Sign a payload with the deployment Ed25519 key (EdDSA).
#[instrument(skip_all)]
pub fn sign_eddsa(
    payload: &Map<String, Value>,
    private_key_pkcs8: &[u8],
    key_id: &str,
) -> Result<String, TokenError> {
    // Validate the private key format before handing it to jsonwebtoken
    Ed25519KeyPair::from_pkcs8(private_key_pkcs8)
        .map_err(|e| TokenError::Signing(format!("Invalid private key format: {}", e)))?;

    let encoding_key = EncodingKey::from_ed_der(private_key_pkcs8);

    let mut header = Header::new(Algorithm::EdDSA);
    header.typ = Some(JWT_TYPE.to_string());
    header.kid = Some(key_id.to_string());

    encode(&header, payload, &encoding_key)
        .map_err(|e| TokenError::Signing(format!("JWT signing operation failed: {}", e)))
}

/// Sign a payload with a client shared secret (HS256).
///
/// The secret's UTF-8 octets are the HMAC key.
#[instrument(skip_all)]
pub fn sign_hs256(
    payload: &Map<String, Value>,
    shared_secret: &[u8],
) -> Result<String, TokenError> {
    if shared_secret.is_empty() {
        return Err(TokenError::MissingCredential(
            "Client shared secret is empty".to_string(),
        ));
    }

    let encoding_key = EncodingKey::from_secret(shared_secret);

    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some(JWT_TYPE.to_string());

    encode(&header, payload, &encoding_key)
        .map_err(|e| TokenError::Signing(format!("JWT signing operation failed: {}", e)))
}
