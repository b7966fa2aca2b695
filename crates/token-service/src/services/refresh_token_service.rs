use crate::clock::Clock;
use crate::crypto;
use crate::errors::TokenError;
use crate::models::{Client, RefreshToken, Token};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_refresh_token_issued;
use crate::repositories::RefreshTokenStore;
use std::sync::Arc;
use tracing::instrument;

/// Mints refresh token handles and persists their records.
#[derive(Clone)]
pub struct RefreshTokenIssuer {
    store: Arc<dyn RefreshTokenStore>,
    clock: Arc<dyn Clock>,
}

impl RefreshTokenIssuer {
    pub fn new(store: Arc<dyn RefreshTokenStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Issue a refresh token bound to `access_token` and return its handle.
    ///
    /// The record's lifetime is the client's refresh token lifetime. Handle
    /// uniqueness is left to the 128-bit random space and the store.
    #[instrument(skip_all, fields(client = %hash_for_correlation(&client.client_id)))]
    pub async fn create_refresh_token(
        &self,
        client: &Client,
        access_token: &Token,
    ) -> Result<String, TokenError> {
        let result = self.issue(client, access_token).await;

        match &result {
            Ok(_) => {
                record_refresh_token_issued("success");
                tracing::debug!(
                    target: "token.refresh",
                    lifetime = client.refresh_token_lifetime,
                    "Refresh token issued"
                );
            }
            Err(e) => {
                record_refresh_token_issued("error");
                tracing::warn!(
                    target: "token.refresh",
                    error = %e,
                    "Refresh token issuance failed"
                );
            }
        }

        result
    }

    async fn issue(&self, client: &Client, access_token: &Token) -> Result<String, TokenError> {
        let handle = crypto::generate_handle()?;

        let record = RefreshToken {
            handle: handle.clone(),
            client_id: client.client_id.clone(),
            creation_time: self.clock.now(),
            lifetime: client.refresh_token_lifetime,
            access_token: access_token.clone(),
        };

        self.store.store(&handle, &record).await?;

        Ok(handle)
    }
}
