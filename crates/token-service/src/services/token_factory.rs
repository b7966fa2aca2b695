use crate::clock::Clock;
use crate::config::Settings;
use crate::errors::TokenError;
use crate::models::{Token, TokenCreationRequest, TokenType};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_token_created;
use crate::services::claims_service::{
    self, AccessClaimsContext, ClaimsProvider, IdentityClaimsContext, UserLookup,
};
use std::sync::Arc;
use tracing::instrument;

/// Builds unserialized identity and access tokens.
///
/// Every call returns a fresh `Token`; nothing is cached between calls.
#[derive(Clone)]
pub struct TokenFactory {
    settings: Arc<Settings>,
    claims_provider: Arc<dyn ClaimsProvider>,
    user_lookup: Arc<dyn UserLookup>,
    clock: Arc<dyn Clock>,
}

impl TokenFactory {
    pub fn new(
        settings: Arc<Settings>,
        claims_provider: Arc<dyn ClaimsProvider>,
        user_lookup: Arc<dyn UserLookup>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            claims_provider,
            user_lookup,
            clock,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Identity token addressed to the requesting client.
    #[instrument(
        skip_all,
        fields(client = %hash_for_correlation(&request.client.client_id), token_type = "id_token")
    )]
    pub async fn create_identity_token(
        &self,
        request: &TokenCreationRequest,
    ) -> Result<Token, TokenError> {
        let ctx = IdentityClaimsContext {
            subject: &request.subject,
            client: &request.client,
            scopes: &request.scopes,
            settings: &self.settings,
            include_all_identity_claims: request.include_all_identity_claims,
            user_lookup: self.user_lookup.as_ref(),
            request: &request.request,
        };

        let claims = claims_service::identity_token_claims(
            self.claims_provider.as_ref(),
            ctx,
            request.access_token_to_hash.as_deref(),
            self.clock.now(),
        )
        .await
        .inspect_err(|e| {
            tracing::debug!(target: "token.factory", error = %e, "Identity claim assembly failed");
            record_token_created(TokenType::Identity.as_str(), "error");
        })?;

        let token = Token::new(
            TokenType::Identity,
            self.settings.issuer_uri.clone(),
            request.client.client_id.clone(),
            request.client.identity_token_lifetime,
            claims,
            Arc::clone(&request.client),
        );

        record_token_created(TokenType::Identity.as_str(), "success");
        tracing::debug!(
            target: "token.factory",
            claims = token.claims().len(),
            lifetime = token.lifetime(),
            "Identity token created"
        );

        Ok(token)
    }

    /// Access token addressed to the issuer's resource namespace.
    #[instrument(
        skip_all,
        fields(
            client = %hash_for_correlation(&request.client.client_id),
            token_type = "access_token"
        )
    )]
    pub async fn create_access_token(
        &self,
        request: &TokenCreationRequest,
    ) -> Result<Token, TokenError> {
        let ctx = AccessClaimsContext {
            subject: &request.subject,
            client: &request.client,
            scopes: &request.scopes,
            settings: &self.settings,
            user_lookup: self.user_lookup.as_ref(),
            request: &request.request,
        };

        let claims = claims_service::access_token_claims(self.claims_provider.as_ref(), ctx)
            .await
            .inspect_err(|e| {
                tracing::debug!(
                    target: "token.factory",
                    error = %e,
                    "Access claim assembly failed"
                );
                record_token_created(TokenType::Access.as_str(), "error");
            })?;

        let token = Token::new(
            TokenType::Access,
            self.settings.issuer_uri.clone(),
            self.settings.access_token_audience(),
            request.client.access_token_lifetime,
            claims,
            Arc::clone(&request.client),
        );

        record_token_created(TokenType::Access.as_str(), "success");
        tracing::debug!(
            target: "token.factory",
            claims = token.claims().len(),
            lifetime = token.lifetime(),
            "Access token created"
        );

        Ok(token)
    }
}
