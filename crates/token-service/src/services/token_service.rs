use crate::errors::TokenError;
use crate::models::{Client, Token, TokenCreationRequest};
use crate::services::refresh_token_service::RefreshTokenIssuer;
use crate::services::token_factory::TokenFactory;
use crate::services::token_serializer::TokenSerializer;
use std::fmt;
use tracing::instrument;

/// Serialized tokens from one issuance.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    pub access_token: String,
    pub identity_token: String,
}

impl fmt::Debug for IssuedTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedTokens")
            .field("access_token", &"[REDACTED]")
            .field("identity_token", &"[REDACTED]")
            .finish()
    }
}

/// Creation and serialization wired together for the endpoint layer.
#[derive(Clone)]
pub struct TokenService {
    factory: TokenFactory,
    serializer: TokenSerializer,
    refresh_issuer: RefreshTokenIssuer,
}

impl TokenService {
    pub fn new(
        factory: TokenFactory,
        serializer: TokenSerializer,
        refresh_issuer: RefreshTokenIssuer,
    ) -> Self {
        Self {
            factory,
            serializer,
            refresh_issuer,
        }
    }

    pub fn factory(&self) -> &TokenFactory {
        &self.factory
    }

    pub fn serializer(&self) -> &TokenSerializer {
        &self.serializer
    }

    /// Create and serialize an identity token.
    pub async fn issue_identity_token(
        &self,
        request: &TokenCreationRequest,
    ) -> Result<String, TokenError> {
        let token = self.factory.create_identity_token(request).await?;
        self.serializer.serialize(&token).await
    }

    /// Create and serialize an access token. The unserialized token is
    /// returned too, for binding a refresh token to it.
    pub async fn issue_access_token(
        &self,
        request: &TokenCreationRequest,
    ) -> Result<(Token, String), TokenError> {
        let token = self.factory.create_access_token(request).await?;
        let serialized = self.serializer.serialize(&token).await?;
        Ok((token, serialized))
    }

    /// Hybrid flow: the access token is serialized first and its string is
    /// bound into the identity token through `at_hash`.
    #[instrument(skip_all)]
    pub async fn issue_hybrid(
        &self,
        request: &TokenCreationRequest,
    ) -> Result<IssuedTokens, TokenError> {
        let (_, access_token) = self.issue_access_token(request).await?;

        let identity_request = request
            .clone()
            .with_access_token_to_hash(access_token.clone());
        let identity_token = self.issue_identity_token(&identity_request).await?;

        Ok(IssuedTokens {
            access_token,
            identity_token,
        })
    }

    pub async fn create_refresh_token(
        &self,
        client: &Client,
        access_token: &Token,
    ) -> Result<String, TokenError> {
        self.refresh_issuer
            .create_refresh_token(client, access_token)
            .await
    }
}
