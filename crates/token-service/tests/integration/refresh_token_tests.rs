//! Refresh token issuance

use chrono::Duration;
use token_test_utils::*;

#[tokio::test]
async fn test_refresh_handle_format_and_record() -> Result<(), anyhow::Error> {
    let issuer = TestIssuer::new();
    let client = TestClientBuilder::new()
        .with_lifetimes(300, 1800, 86_400)
        .build();
    let request = TestRequestBuilder::new().for_client(client.clone()).build();

    let access_token = issuer.factory.create_access_token(&request).await?;
    let handle = issuer
        .refresh_issuer
        .create_refresh_token(&client, &access_token)
        .await?;

    handle.assert_reference_handle();

    let record = issuer
        .refresh_store
        .get(&handle)
        .await
        .expect("record stored under handle");
    assert_eq!(record.handle, handle);
    assert_eq!(record.client_id, client.client_id);
    assert_eq!(record.lifetime, client.refresh_token_lifetime);
    assert_eq!(record.creation_time, issuer.clock.0);
    assert_eq!(record.expires_at(), issuer.clock.0 + Duration::seconds(86_400));
    assert_eq!(record.access_token.audience(), TEST_RESOURCE_AUDIENCE);
    assert_eq!(record.access_token.claims(), access_token.claims());
    Ok(())
}

#[tokio::test]
async fn test_refresh_record_matches_each_client() -> Result<(), anyhow::Error> {
    let issuer = TestIssuer::new();

    for (client_id, lifetime) in [(TEST_CLIENT_ID_WEB, 3_600), (TEST_CLIENT_ID_MOBILE, 7_776_000)] {
        let client = TestClientBuilder::new()
            .with_client_id(client_id)
            .with_lifetimes(300, 600, lifetime)
            .build();
        let access_token = issuer
            .factory
            .create_access_token(&TestRequestBuilder::new().for_client(client.clone()).build())
            .await?;

        let handle = issuer
            .service
            .create_refresh_token(&client, &access_token)
            .await?;

        let record = issuer.refresh_store.get(&handle).await.expect("stored");
        assert_eq!(record.client_id, client_id);
        assert_eq!(record.lifetime, lifetime);
    }

    assert_eq!(issuer.refresh_store.len().await, 2);
    Ok(())
}

#[tokio::test]
async fn test_refresh_does_not_touch_reference_store() -> Result<(), anyhow::Error> {
    let issuer = TestIssuer::new();
    let client = TestClientBuilder::new().build();
    let access_token = issuer
        .factory
        .create_access_token(&TestRequestBuilder::new().for_client(client.clone()).build())
        .await?;

    issuer
        .refresh_issuer
        .create_refresh_token(&client, &access_token)
        .await?;

    assert!(issuer.reference_store.is_empty().await);
    assert_eq!(issuer.refresh_store.len().await, 1);
    Ok(())
}
