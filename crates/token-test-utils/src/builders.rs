//! Builder patterns for test data construction
//!
//! Provides fluent APIs for creating clients and token creation requests.

use crate::test_ids::*;
use std::sync::Arc;
use token_service::config::ClientLifetimes;
use token_service::models::{
    AccessTokenType, Claim, Client, IdentityTokenSigningKeyType, RequestParameters, Scope,
    Subject, TokenCreationRequest,
};

/// Builder for test clients
///
/// # Example
/// ```rust,ignore
/// let client = TestClientBuilder::new()
///     .with_client_secret(TEST_CLIENT_SECRET)
///     .reference_access_tokens()
///     .build();
/// ```
pub struct TestClientBuilder {
    client: Client,
}

impl TestClientBuilder {
    /// Web client with asymmetric identity tokens and JWT access tokens
    pub fn new() -> Self {
        Self {
            client: Client::new(TEST_CLIENT_ID_WEB),
        }
    }

    pub fn with_client_id(mut self, client_id: &str) -> Self {
        self.client.client_id = client_id.to_string();
        self
    }

    pub fn with_lifetimes(mut self, identity: u64, access: u64, refresh: u64) -> Self {
        self.client = self.client.with_lifetimes(ClientLifetimes {
            identity_token: identity,
            access_token: access,
            refresh_token: refresh,
        });
        self
    }

    /// Sign identity tokens with the given shared secret (HS256)
    pub fn with_client_secret(mut self, secret: &str) -> Self {
        self.client = self
            .client
            .with_identity_token_signing(IdentityTokenSigningKeyType::ClientSecret)
            .with_client_secret(secret);
        self
    }

    /// Sign identity tokens with the shared-secret key type but no secret
    pub fn client_secret_signing_without_secret(mut self) -> Self {
        self.client = self
            .client
            .with_identity_token_signing(IdentityTokenSigningKeyType::ClientSecret);
        self.client.client_secret = None;
        self
    }

    pub fn reference_access_tokens(mut self) -> Self {
        self.client = self.client.with_access_token_type(AccessTokenType::Reference);
        self
    }

    pub fn build(self) -> Arc<Client> {
        Arc::new(self.client)
    }
}

impl Default for TestClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for token creation requests
///
/// Defaults to Alice, the default web client and the `openid`, `email` and
/// `api.read` scopes.
pub struct TestRequestBuilder {
    subject: Subject,
    client: Arc<Client>,
    scopes: Vec<Scope>,
    include_all: bool,
    params: RequestParameters,
    access_token_to_hash: Option<String>,
}

impl TestRequestBuilder {
    pub fn new() -> Self {
        Self {
            subject: Subject::new(TEST_SUBJECT_ALICE.to_string()),
            client: TestClientBuilder::new().build(),
            scopes: vec![
                Scope::identity(SCOPE_OPENID, &["sub"]),
                Scope::identity(SCOPE_EMAIL, &["email", "email_verified"]),
                Scope::resource(SCOPE_API_READ),
            ],
            include_all: false,
            params: RequestParameters::new(),
            access_token_to_hash: None,
        }
    }

    pub fn for_subject(mut self, subject_id: &str) -> Self {
        self.subject = Subject::new(subject_id);
        self
    }

    pub fn with_subject_claim(mut self, claim: Claim) -> Self {
        self.subject = self.subject.with_claim(claim);
        self
    }

    pub fn for_client(mut self, client: Arc<Client>) -> Self {
        self.client = client;
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<Scope>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn include_all_identity_claims(mut self) -> Self {
        self.include_all = true;
        self
    }

    pub fn with_nonce(mut self, nonce: &str) -> Self {
        self.params = self.params.with("nonce", nonce);
        self
    }

    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.params = self.params.with(name, value);
        self
    }

    pub fn binding_access_token(mut self, access_token: &str) -> Self {
        self.access_token_to_hash = Some(access_token.to_string());
        self
    }

    pub fn build(self) -> TokenCreationRequest {
        let mut request = TokenCreationRequest::new(self.subject, self.client)
            .with_scopes(self.scopes)
            .with_request(self.params)
            .include_all_identity_claims(self.include_all);
        if let Some(access_token) = self.access_token_to_hash {
            request = request.with_access_token_to_hash(access_token);
        }
        request
    }
}

impl Default for TestRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
