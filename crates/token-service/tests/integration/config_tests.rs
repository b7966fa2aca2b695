//! Configuration-driven wiring: environment settings through to signed tokens

use base64::{engine::general_purpose, Engine as _};
use std::collections::HashMap;
use std::sync::Arc;
use token_service::config::{ConfigError, Settings};
use token_service::models::Client;
use token_service::services::key_management_service::{
    SigningCredentialSource, StaticSigningCredentialSource,
};
use token_service::{SystemClock, TokenFactory, TokenSerializer};
use token_test_utils::*;

fn env_vars(pkcs8: &[u8]) -> HashMap<String, String> {
    HashMap::from([
        ("OIDC_ISSUER_URI".to_string(), TEST_ISSUER.to_string()),
        (
            "OIDC_SIGNING_KEY".to_string(),
            general_purpose::STANDARD.encode(pkcs8),
        ),
        ("OIDC_SIGNING_KEY_ID".to_string(), TEST_KEY_ID_2.to_string()),
        (
            "OIDC_DEFAULT_ACCESS_TOKEN_LIFETIME".to_string(),
            "900".to_string(),
        ),
    ])
}

#[tokio::test]
async fn test_configured_key_signs_tokens() -> Result<(), anyhow::Error> {
    let (public_pem, pkcs8) = test_signing_key(9)?;
    let settings = Arc::new(Settings::from_vars(&env_vars(&pkcs8))?);

    let credentials = StaticSigningCredentialSource::from_settings(&settings)?;
    let credential = credentials
        .signing_credential()
        .await?
        .expect("credential configured");
    assert_eq!(credential.key_id(), TEST_KEY_ID_2);
    assert_eq!(credential.public_key_pem()?, public_pem);

    let factory = TokenFactory::new(
        Arc::clone(&settings),
        Arc::new(ScopeClaimsProvider::new()),
        Arc::new(StaticUserLookup::new()),
        Arc::new(SystemClock),
    );
    let serializer = TokenSerializer::new(
        Arc::new(credentials),
        Arc::new(InMemoryReferenceTokenStore::new()),
        Arc::new(SystemClock),
    );

    let client =
        Arc::new(Client::new(TEST_CLIENT_ID_WEB).with_lifetimes(settings.client_lifetimes));
    let request = TestRequestBuilder::new().for_client(client).build();
    let token = factory.create_access_token(&request).await?;
    let jwt = serializer.serialize(&token).await?;

    jwt.assert_valid_jwt()
        .assert_signed_by(TEST_KEY_ID_2)
        .assert_lifetime(900);
    verify_eddsa(&jwt, &public_key_bytes(&public_pem)?, TEST_RESOURCE_AUDIENCE)?;
    Ok(())
}

#[test]
fn test_settings_without_key_yield_empty_source() -> Result<(), anyhow::Error> {
    let vars = HashMap::from([("OIDC_ISSUER_URI".to_string(), TEST_ISSUER.to_string())]);
    let settings = Settings::from_vars(&vars)?;

    assert!(settings.signing_key.is_none());
    assert_eq!(settings.access_token_audience(), TEST_RESOURCE_AUDIENCE);
    StaticSigningCredentialSource::from_settings(&settings)?;
    Ok(())
}

#[test]
fn test_settings_reject_truncated_key() -> Result<(), anyhow::Error> {
    let (_, pkcs8) = test_signing_key(9)?;
    let truncated = pkcs8.get(..40).expect("fixture is 85 bytes");

    let result = Settings::from_vars(&env_vars(truncated));
    assert!(matches!(result, Err(ConfigError::InvalidSigningKey(_))));
    Ok(())
}
