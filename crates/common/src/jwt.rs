//! JWT utilities shared across the token service crates.
//!
//! This module provides:
//! - Registered and OpenID Connect claim names used by the issuer
//! - Size limits for compact tokens
//! - Unverified inspection of compact token headers and payloads
//!
//! # Security
//!
//! Nothing here verifies a signature. Inspection helpers exist for tooling and
//! tests (reading the `kid`, asserting on issued claims); they must never feed
//! a trust decision.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::{Map, Value};
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum compact token size accepted by the inspection helpers (8KB).
///
/// Checked BEFORE base64 decoding.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// `typ` header value for every signed token the issuer produces.
pub const JWT_TYPE: &str = "JWT";

/// Claim names.
pub mod claim_names {
    /// Issuer.
    pub const ISSUER: &str = "iss";
    /// Audience.
    pub const AUDIENCE: &str = "aud";
    /// Expiration time (epoch seconds).
    pub const EXPIRATION: &str = "exp";
    /// Not before (epoch seconds).
    pub const NOT_BEFORE: &str = "nbf";
    /// Issued at (epoch seconds).
    pub const ISSUED_AT: &str = "iat";
    /// Subject identifier.
    pub const SUBJECT: &str = "sub";
    /// Replay-protection value echoed from the authorization request.
    pub const NONCE: &str = "nonce";
    /// Access token hash binding an identity token to an access token.
    pub const ACCESS_TOKEN_HASH: &str = "at_hash";
    /// OAuth client identifier.
    pub const CLIENT_ID: &str = "client_id";
    /// Granted scope.
    pub const SCOPE: &str = "scope";
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors raised while inspecting a compact token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtInspectError {
    /// Token size exceeds maximum allowed.
    #[error("Token exceeds {MAX_JWT_SIZE_BYTES} bytes")]
    TokenTooLarge,

    /// Token is not three base64url segments of JSON.
    #[error("Token is not a well-formed compact JWT")]
    MalformedToken,

    /// Token header has no usable `kid`.
    #[error("Token header is missing a kid")]
    MissingKid,
}

// =============================================================================
// Functions
// =============================================================================

/// Split a compact token into its header, payload and signature segments.
///
/// # Errors
///
/// - `TokenTooLarge` if the token exceeds [`MAX_JWT_SIZE_BYTES`]
/// - `MalformedToken` if it does not have exactly three segments
pub fn split_compact(token: &str) -> Result<(&str, &str, &str), JwtInspectError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtInspectError::TokenTooLarge);
    }

    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None) => Ok((header, payload, signature)),
        _ => Err(JwtInspectError::MalformedToken),
    }
}

fn decode_segment(segment: &str) -> Result<Map<String, Value>, JwtInspectError> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT segment base64");
        JwtInspectError::MalformedToken
    })?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(JwtInspectError::MalformedToken),
        Err(e) => {
            tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT segment JSON");
            Err(JwtInspectError::MalformedToken)
        }
    }
}

/// Decode the JOSE header of a compact token WITHOUT verifying it.
///
/// # Errors
///
/// See [`split_compact`]; also `MalformedToken` for bad base64 or non-object JSON.
pub fn decode_header_unverified(token: &str) -> Result<Map<String, Value>, JwtInspectError> {
    let (header, _, _) = split_compact(token)?;
    decode_segment(header)
}

/// Decode the claims payload of a compact token WITHOUT verifying it.
///
/// # Errors
///
/// See [`decode_header_unverified`].
pub fn decode_payload_unverified(token: &str) -> Result<Map<String, Value>, JwtInspectError> {
    let (_, payload, _) = split_compact(token)?;
    decode_segment(payload)
}

/// Extract the `kid` (key ID) from a compact token header without verifying it.
///
/// # Errors
///
/// `MissingKid` when the header has no non-empty string `kid`; otherwise see
/// [`decode_header_unverified`].
pub fn extract_kid(token: &str) -> Result<String, JwtInspectError> {
    let header = decode_header_unverified(token)?;

    header
        .get("kid")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or(JwtInspectError::MissingKid)
}
