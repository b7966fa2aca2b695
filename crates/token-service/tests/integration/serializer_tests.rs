//! Serializer key selection at the crate boundary

use std::sync::Arc;
use token_service::errors::TokenError;
use token_service::models::{Claim, Token, TokenType};
use token_service::services::token_serializer::{select_encoding, TokenEncoding};
use token_test_utils::*;

fn foreign_token(token_type: &str) -> Token {
    Token::new(
        TokenType::from(token_type),
        TEST_ISSUER,
        TEST_CLIENT_ID_WEB,
        300,
        vec![Claim::new("sub", "alice")],
        TestClientBuilder::new().build(),
    )
}

#[tokio::test]
async fn test_unknown_token_types_are_rejected() {
    init_test_tracing();
    let issuer = TestIssuer::new();

    for token_type in [
        "refresh_token",
        "authorization_code",
        "urn:ietf:params:oauth:token-type:saml2",
        "",
    ] {
        let result = issuer.serializer.serialize(&foreign_token(token_type)).await;
        assert_eq!(
            result,
            Err(TokenError::InvalidTokenType(token_type.to_string())),
            "{:?} should be rejected",
            token_type
        );
    }

    assert!(issuer.reference_store.is_empty().await);
}

#[tokio::test]
async fn test_token_type_parsed_from_storage_selects_encoding() {
    // Stored representations carry type strings
    let parsed: TokenType = serde_json::from_str("\"id_token\"").expect("valid json");
    let token = Token::new(
        parsed,
        TEST_ISSUER,
        TEST_CLIENT_ID_WEB,
        300,
        Vec::new(),
        TestClientBuilder::new().with_client_secret(TEST_CLIENT_SECRET).build(),
    );

    assert_eq!(select_encoding(&token), Ok(TokenEncoding::ClientSecret));
}

#[tokio::test]
async fn test_missing_signing_credential() -> Result<(), anyhow::Error> {
    let issuer = TestIssuer::builder().without_signing_credential().build();

    let access = issuer
        .factory
        .create_access_token(&TestRequestBuilder::new().build())
        .await?;
    assert!(matches!(
        issuer.serializer.serialize(&access).await,
        Err(TokenError::MissingCredential(_))
    ));

    let identity = issuer
        .factory
        .create_identity_token(&TestRequestBuilder::new().build())
        .await?;
    assert!(matches!(
        issuer.serializer.serialize(&identity).await,
        Err(TokenError::MissingCredential(_))
    ));

    // Shared-secret identity tokens and reference access tokens need no deployment key
    let secret_client = TestClientBuilder::new()
        .with_client_secret(TEST_CLIENT_SECRET)
        .reference_access_tokens()
        .build();
    let request = TestRequestBuilder::new().for_client(secret_client).build();
    let identity = issuer.factory.create_identity_token(&request).await?;
    issuer
        .serializer
        .serialize(&identity)
        .await?
        .assert_valid_jwt()
        .assert_algorithm("HS256");
    let access = issuer.factory.create_access_token(&request).await?;
    issuer
        .serializer
        .serialize(&access)
        .await?
        .assert_reference_handle();
    Ok(())
}

#[tokio::test]
async fn test_client_secret_signing_without_secret() -> Result<(), anyhow::Error> {
    let issuer = TestIssuer::new();
    let client = TestClientBuilder::new()
        .client_secret_signing_without_secret()
        .build();

    let token = issuer
        .factory
        .create_identity_token(&TestRequestBuilder::new().for_client(client).build())
        .await?;

    assert!(matches!(
        issuer.serializer.serialize(&token).await,
        Err(TokenError::MissingCredential(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_serialization_is_concurrency_safe() -> Result<(), anyhow::Error> {
    let issuer = Arc::new(TestIssuer::new());
    let client = TestClientBuilder::new().reference_access_tokens().build();
    let token = issuer
        .factory
        .create_access_token(&TestRequestBuilder::new().for_client(client).build())
        .await?;

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let issuer = Arc::clone(&issuer);
        let token = token.clone();
        tasks.push(tokio::spawn(async move {
            issuer.serializer.serialize(&token).await
        }));
    }

    let mut handles = std::collections::HashSet::new();
    for task in tasks {
        handles.insert(task.await??);
    }
    assert_eq!(handles.len(), 16);
    assert_eq!(issuer.reference_store.len().await, 16);
    Ok(())
}
