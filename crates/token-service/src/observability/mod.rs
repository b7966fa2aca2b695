//! Observability for token issuance.
//!
//! # Privacy by Default
//!
//! All instrumentation uses `#[instrument(skip_all)]` and explicit safe field
//! allow-listing. Fields are categorized as:
//! - **SAFE**: Can be logged in plaintext (token type, encoding, lifetimes)
//! - **HASHED**: Must be SHA-256 hashed for correlation (client_id)
//! - **NEVER**: Must never appear in logs (subject ids, secrets, token strings,
//!   handles, nonces)

pub mod metrics;

use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// Used for fields like `client_id` that need correlation across log entries
/// but should not be stored in plaintext. Not suitable for secrets.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    let (prefix, _) = digest.split_at(4);
    hex::encode(prefix)
}
