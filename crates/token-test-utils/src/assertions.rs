//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for serialized tokens. Signatures are not
//! verified here; use `jsonwebtoken::decode` with the fixture keys for that.

use common::jwt::{decode_header_unverified, decode_payload_unverified, extract_kid};
use serde_json::Value;

/// Custom assertions for serialized tokens
///
/// # Example
/// ```rust,ignore
/// jwt.assert_valid_jwt()
///     .assert_algorithm("EdDSA")
///     .assert_signed_by(TEST_KEY_ID_1)
///     .assert_audience(TEST_RESOURCE_AUDIENCE);
/// ```
pub trait TokenAssertions {
    /// Assert three base64url JSON segments with `typ: JWT`
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert a 32 character lowercase hex reference handle
    fn assert_reference_handle(&self) -> &Self;

    /// Assert the header `alg`
    fn assert_algorithm(&self, alg: &str) -> &Self;

    /// Assert the header `kid`
    fn assert_signed_by(&self, key_id: &str) -> &Self;

    fn assert_issuer(&self, issuer: &str) -> &Self;

    fn assert_audience(&self, audience: &str) -> &Self;

    /// Assert a claim value; for array claims, assert membership
    fn assert_claim(&self, name: &str, value: &str) -> &Self;

    fn assert_no_claim(&self, name: &str) -> &Self;

    /// Assert `exp - nbf` equals the given lifetime
    fn assert_lifetime(&self, seconds: i64) -> &Self;
}

fn payload(token: &str) -> serde_json::Map<String, Value> {
    decode_payload_unverified(token).expect("Failed to decode JWT payload")
}

fn value_matches(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Array(values) => values.iter().any(|v| value_matches(v, expected)),
        other => other.to_string() == expected,
    }
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );

        let header = decode_header_unverified(self);
        assert!(header.is_ok(), "Failed to decode JWT header: {:?}", header.err());
        let header = header.unwrap();
        assert_eq!(
            header.get("typ").and_then(Value::as_str),
            Some("JWT"),
            "Expected JWT type"
        );

        let claims = decode_payload_unverified(self);
        assert!(claims.is_ok(), "Failed to decode JWT payload: {:?}", claims.err());

        self
    }

    fn assert_reference_handle(&self) -> &Self {
        assert_eq!(self.len(), 32, "Handle must be 32 characters, got {}", self.len());
        assert!(
            self.chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
            "Handle must be lowercase hex: {}",
            self
        );
        assert!(!self.contains('.'), "Handle must not be a compact token");
        self
    }

    fn assert_algorithm(&self, alg: &str) -> &Self {
        let header = decode_header_unverified(self).expect("Failed to decode JWT header");
        assert_eq!(
            header.get("alg").and_then(Value::as_str),
            Some(alg),
            "Expected algorithm '{}'",
            alg
        );
        self
    }

    fn assert_signed_by(&self, key_id: &str) -> &Self {
        let kid = extract_kid(self);
        assert_eq!(
            kid.as_deref().ok(),
            Some(key_id),
            "Expected key_id '{}', got {:?}",
            key_id,
            kid
        );
        self
    }

    fn assert_issuer(&self, issuer: &str) -> &Self {
        let claims = payload(self);
        assert_eq!(
            claims.get("iss").and_then(Value::as_str),
            Some(issuer),
            "Expected issuer '{}'",
            issuer
        );
        self
    }

    fn assert_audience(&self, audience: &str) -> &Self {
        let claims = payload(self);
        assert_eq!(
            claims.get("aud").and_then(Value::as_str),
            Some(audience),
            "Expected audience '{}'",
            audience
        );
        self
    }

    fn assert_claim(&self, name: &str, value: &str) -> &Self {
        let claims = payload(self);
        let actual = claims.get(name);
        assert!(
            actual.is_some_and(|v| value_matches(v, value)),
            "Expected claim '{}' = '{}', got {:?}",
            name,
            value,
            actual
        );
        self
    }

    fn assert_no_claim(&self, name: &str) -> &Self {
        let claims = payload(self);
        assert!(
            !claims.contains_key(name),
            "Expected no '{}' claim, got {:?}",
            name,
            claims.get(name)
        );
        self
    }

    fn assert_lifetime(&self, seconds: i64) -> &Self {
        let claims = payload(self);
        let nbf = claims.get("nbf").and_then(Value::as_i64).expect("Missing nbf");
        let exp = claims.get("exp").and_then(Value::as_i64).expect("Missing exp");
        assert_eq!(
            exp - nbf,
            seconds,
            "Expected lifetime {} seconds, got {}",
            seconds,
            exp - nbf
        );
        self
    }
}
