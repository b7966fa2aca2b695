//! Collaborator failures reach the caller unchanged
//!
//! Each test swaps one collaborator for a failing stub and checks the exact
//! error value, plus that nothing was persisted along the way.

use std::sync::Arc;
use token_service::errors::TokenError;
use token_test_utils::*;

#[tokio::test]
async fn test_claims_provider_failure_on_identity_token() {
    let error = TokenError::ClaimsProvider("scope resolver unavailable".to_string());
    let issuer = TestIssuer::builder()
        .with_claims_provider(Arc::new(FailingClaimsProvider(error.clone())))
        .build();

    let result = issuer
        .factory
        .create_identity_token(&TestRequestBuilder::new().with_nonce(TEST_NONCE).build())
        .await;

    assert_eq!(result.map(|_| ()), Err(error));
}

#[tokio::test]
async fn test_claims_provider_failure_on_access_token() {
    let error = TokenError::ClaimsProvider("scope resolver unavailable".to_string());
    let issuer = TestIssuer::builder()
        .with_claims_provider(Arc::new(FailingClaimsProvider(error.clone())))
        .build();

    let result = issuer
        .service
        .issue_access_token(&TestRequestBuilder::new().build())
        .await;

    assert_eq!(result.map(|_| ()), Err(error));
    assert!(issuer.reference_store.is_empty().await);
}

#[tokio::test]
async fn test_user_lookup_failure_surfaces_through_provider() {
    let error = TokenError::UserLookup("directory timeout".to_string());
    let issuer = TestIssuer::builder()
        .with_user_lookup(Arc::new(FailingUserLookup(error.clone())))
        .build();

    // Only consulted when all identity claims are requested
    let minimal = issuer
        .factory
        .create_identity_token(&TestRequestBuilder::new().build())
        .await;
    assert!(minimal.is_ok());

    let full = issuer
        .factory
        .create_identity_token(&TestRequestBuilder::new().include_all_identity_claims().build())
        .await;
    assert_eq!(full.map(|_| ()), Err(error));
}

#[tokio::test]
async fn test_reference_store_failure() -> Result<(), anyhow::Error> {
    init_test_tracing();
    let error = TokenError::Store("reference store write rejected".to_string());
    let issuer = TestIssuer::builder()
        .with_reference_store(Arc::new(FailingStore(error.clone())))
        .build();
    let client = TestClientBuilder::new().reference_access_tokens().build();

    let token = issuer
        .factory
        .create_access_token(&TestRequestBuilder::new().for_client(client).build())
        .await?;

    assert_eq!(issuer.serializer.serialize(&token).await, Err(error));
    Ok(())
}

#[tokio::test]
async fn test_refresh_store_failure() -> Result<(), anyhow::Error> {
    init_test_tracing();
    let error = TokenError::Store("refresh store write rejected".to_string());
    let issuer = TestIssuer::builder()
        .with_refresh_store(Arc::new(FailingStore(error.clone())))
        .build();
    let client = TestClientBuilder::new().build();

    let token = issuer
        .factory
        .create_access_token(&TestRequestBuilder::new().for_client(client.clone()).build())
        .await?;

    assert_eq!(
        issuer
            .refresh_issuer
            .create_refresh_token(&client, &token)
            .await,
        Err(error)
    );
    assert!(issuer.refresh_store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_hybrid_flow_stops_at_first_failure() {
    init_test_tracing();
    let error = TokenError::Store("reference store write rejected".to_string());
    let issuer = TestIssuer::builder()
        .with_reference_store(Arc::new(FailingStore(error.clone())))
        .build();
    let client = TestClientBuilder::new().reference_access_tokens().build();

    let result = issuer
        .service
        .issue_hybrid(&TestRequestBuilder::new().for_client(client).build())
        .await;

    assert_eq!(result.map(|_| ()), Err(error));
}
