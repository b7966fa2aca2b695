//! Identity token issuance, end to end
//!
//! Covers the protocol claims (nonce echo, issued-at, at_hash), claim
//! deduplication, audience rules and both signing mechanisms.

use std::collections::HashSet;
use std::sync::Arc;
use token_service::crypto;
use token_service::models::{Claim, ClaimValueType, TokenType};
use token_test_utils::*;

// ============================================================================
// Protocol claims
// ============================================================================

#[tokio::test]
async fn test_nonce_is_echoed_exactly_once() -> Result<(), anyhow::Error> {
    let issuer = TestIssuer::new();
    let request = TestRequestBuilder::new().with_nonce(TEST_NONCE).build();

    let token = issuer.factory.create_identity_token(&request).await?;

    let nonces: Vec<&Claim> = token.claims_of_type("nonce").collect();
    assert_eq!(nonces.len(), 1);
    assert_eq!(nonces.first().map(|c| c.value.as_str()), Some(TEST_NONCE));
    Ok(())
}

#[tokio::test]
async fn test_no_nonce_claim_without_nonce_parameter() -> Result<(), anyhow::Error> {
    let issuer = TestIssuer::new();
    let request = TestRequestBuilder::new()
        .with_param("state", "af0ifjsldkj")
        .build();

    let token = issuer.factory.create_identity_token(&request).await?;

    assert_eq!(token.claims_of_type("nonce").count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_provider_nonce_does_not_duplicate_echoed_nonce() -> Result<(), anyhow::Error> {
    let provider = ScopeClaimsProvider::new().with_identity_claim(Claim::new("nonce", TEST_NONCE));
    let issuer = TestIssuer::builder()
        .with_claims_provider(Arc::new(provider))
        .build();
    let request = TestRequestBuilder::new().with_nonce(TEST_NONCE).build();

    let token = issuer.factory.create_identity_token(&request).await?;

    assert_eq!(token.claims_of_type("nonce").count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_issued_at_equals_clock_time() -> Result<(), anyhow::Error> {
    let issuer = TestIssuer::new();
    let request = TestRequestBuilder::new().build();

    let token = issuer.factory.create_identity_token(&request).await?;

    let iat: Vec<&Claim> = token.claims_of_type("iat").collect();
    assert_eq!(iat.len(), 1);
    let iat = iat.first().expect("iat present");
    assert_eq!(iat.value, issuer.clock.0.timestamp().to_string());
    assert_eq!(iat.value_type, ClaimValueType::Integer);

    // And it is rendered as a JSON integer
    let jwt = issuer.serializer.serialize(&token).await?;
    jwt.assert_claim("iat", &issuer.clock.0.timestamp().to_string());
    let claims = verify_eddsa(&jwt, &issuer.public_key, TEST_CLIENT_ID_WEB)?;
    assert_eq!(
        claims.get("iat").and_then(|v| v.as_i64()),
        Some(issuer.clock.0.timestamp())
    );
    Ok(())
}

#[tokio::test]
async fn test_validity_window_follows_injected_clock() -> Result<(), anyhow::Error> {
    let later = FixedClock::default_instant() + chrono::Duration::days(30);
    let issuer = TestIssuer::builder().with_clock(FixedClock(later)).build();
    let request = TestRequestBuilder::new()
        .for_subject(&TEST_SUBJECT_BOB.to_string())
        .build();

    let token = issuer.factory.create_identity_token(&request).await?;
    assert_eq!(token.claim_value("sub"), Some(TEST_SUBJECT_BOB.to_string().as_str()));

    let jwt = issuer.serializer.serialize(&token).await?;
    let claims = verify_eddsa(&jwt, &issuer.public_key, TEST_CLIENT_ID_WEB)?;
    assert_eq!(claims.get("iat").and_then(|v| v.as_i64()), Some(later.timestamp()));
    assert_eq!(claims.get("nbf").and_then(|v| v.as_i64()), Some(later.timestamp()));
    assert_eq!(
        claims.get("sub").and_then(|v| v.as_str()),
        Some(TEST_SUBJECT_BOB.to_string().as_str())
    );
    Ok(())
}

#[tokio::test]
async fn test_at_hash_present_only_when_access_token_supplied() -> Result<(), anyhow::Error> {
    let issuer = TestIssuer::new();

    let bound = TestRequestBuilder::new()
        .binding_access_token("abc.def.ghi")
        .build();
    let token = issuer.factory.create_identity_token(&bound).await?;
    assert_eq!(token.claim_value("at_hash"), Some("ZVnpC13VdAW98YDym1CQUw"));

    let unbound = TestRequestBuilder::new().build();
    let token = issuer.factory.create_identity_token(&unbound).await?;
    assert_eq!(token.claim_value("at_hash"), None);
    Ok(())
}

#[tokio::test]
async fn test_at_hash_matches_serialized_access_token() -> Result<(), anyhow::Error> {
    let issuer = TestIssuer::new();

    let issued = issuer
        .service
        .issue_hybrid(&TestRequestBuilder::new().with_nonce(TEST_NONCE).build())
        .await?;

    issued
        .identity_token
        .assert_valid_jwt()
        .assert_claim("at_hash", &crypto::access_token_hash(&issued.access_token))
        .assert_claim("nonce", TEST_NONCE);
    issued.access_token.assert_no_claim("at_hash");
    Ok(())
}

// ============================================================================
// Claims and audience
// ============================================================================

#[tokio::test]
async fn test_no_duplicate_claim_pairs() -> Result<(), anyhow::Error> {
    let provider = ScopeClaimsProvider::new()
        .with_identity_claim(Claim::new("amr", "pwd"))
        .with_identity_claim(Claim::new("amr", "pwd"))
        .with_identity_claim(Claim::new("email", TEST_EMAIL_ALICE));
    let issuer = TestIssuer::builder()
        .with_claims_provider(Arc::new(provider))
        .build();
    let request = TestRequestBuilder::new()
        .with_subject_claim(Claim::new("amr", "pwd"))
        .include_all_identity_claims()
        .build();

    let token = issuer.factory.create_identity_token(&request).await?;

    let pairs: HashSet<(&str, &str)> = token
        .claims()
        .iter()
        .map(|c| (c.claim_type.as_str(), c.value.as_str()))
        .collect();
    assert_eq!(pairs.len(), token.claims().len());
    assert_eq!(token.claims_of_type("amr").count(), 1);
    assert_eq!(token.claims_of_type("email").count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_include_all_identity_claims_uses_user_lookup() -> Result<(), anyhow::Error> {
    let issuer = TestIssuer::new();

    let minimal = issuer
        .factory
        .create_identity_token(&TestRequestBuilder::new().build())
        .await?;
    assert_eq!(minimal.claim_value("email"), None);

    let full = issuer
        .factory
        .create_identity_token(&TestRequestBuilder::new().include_all_identity_claims().build())
        .await?;
    assert_eq!(full.claim_value("email"), Some(TEST_EMAIL_ALICE));
    assert_eq!(full.claim_value("email_verified"), Some("true"));
    Ok(())
}

#[tokio::test]
async fn test_identity_audience_is_requesting_client() -> Result<(), anyhow::Error> {
    let issuer = TestIssuer::new();

    for client_id in [TEST_CLIENT_ID_WEB, TEST_CLIENT_ID_MOBILE] {
        let client = TestClientBuilder::new().with_client_id(client_id).build();
        let request = TestRequestBuilder::new().for_client(client).build();

        let token = issuer.factory.create_identity_token(&request).await?;

        assert_eq!(token.token_type(), &TokenType::Identity);
        assert_eq!(token.audience(), client_id);
        assert_eq!(token.issuer(), TEST_ISSUER);
    }
    Ok(())
}

#[tokio::test]
async fn test_lifetime_copied_from_client() -> Result<(), anyhow::Error> {
    let issuer = TestIssuer::new();
    let client = TestClientBuilder::new().with_lifetimes(120, 900, 3600).build();
    let request = TestRequestBuilder::new().for_client(client).build();

    let token = issuer.factory.create_identity_token(&request).await?;
    assert_eq!(token.lifetime(), 120);

    let jwt = issuer.serializer.serialize(&token).await?;
    jwt.assert_lifetime(120);
    Ok(())
}

// ============================================================================
// Signing
// ============================================================================

#[tokio::test]
async fn test_asymmetric_identity_token_verifies() -> Result<(), anyhow::Error> {
    let issuer = TestIssuer::new();
    let request = TestRequestBuilder::new().with_nonce(TEST_NONCE).build();

    let jwt = issuer.service.issue_identity_token(&request).await?;

    jwt.assert_valid_jwt()
        .assert_algorithm("EdDSA")
        .assert_signed_by(TEST_KEY_ID_1)
        .assert_issuer(TEST_ISSUER)
        .assert_audience(TEST_CLIENT_ID_WEB);
    let claims = verify_eddsa(&jwt, &issuer.public_key, TEST_CLIENT_ID_WEB)?;
    assert_eq!(
        claims.get("sub").and_then(|v| v.as_str()),
        Some(TEST_SUBJECT_ALICE.to_string().as_str())
    );
    Ok(())
}

#[tokio::test]
async fn test_client_secret_and_asymmetric_differ_only_in_signature() -> Result<(), anyhow::Error> {
    let issuer = TestIssuer::new();
    let secret_client = TestClientBuilder::new()
        .with_client_secret(TEST_CLIENT_SECRET)
        .build();
    let asymmetric_client = TestClientBuilder::new().build();

    let hs_token = issuer
        .factory
        .create_identity_token(
            &TestRequestBuilder::new()
                .for_client(secret_client)
                .with_nonce(TEST_NONCE)
                .build(),
        )
        .await?;
    let ed_token = issuer
        .factory
        .create_identity_token(
            &TestRequestBuilder::new()
                .for_client(asymmetric_client)
                .with_nonce(TEST_NONCE)
                .build(),
        )
        .await?;

    let hs = issuer.serializer.serialize(&hs_token).await?;
    let ed = issuer.serializer.serialize(&ed_token).await?;

    hs.assert_valid_jwt().assert_algorithm("HS256");
    ed.assert_valid_jwt().assert_algorithm("EdDSA");

    let hs_claims = verify_hs256(&hs, TEST_CLIENT_SECRET, TEST_CLIENT_ID_WEB)?;
    let ed_claims = verify_eddsa(&ed, &issuer.public_key, TEST_CLIENT_ID_WEB)?;
    assert_eq!(hs_claims, ed_claims);

    // Neither verifies under the other's key
    assert!(verify_hs256(&ed, TEST_CLIENT_SECRET, TEST_CLIENT_ID_WEB).is_err());
    assert!(verify_eddsa(&hs, &issuer.public_key, TEST_CLIENT_ID_WEB).is_err());
    Ok(())
}
