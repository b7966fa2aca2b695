//! Token serialization.
//!
//! Key selection is a pure function of the token type and the owning client's
//! policy:
//!
//! | Token type | Client policy              | Encoding       |
//! |------------|----------------------------|----------------|
//! | access     | `AccessTokenType::Jwt`     | `Asymmetric`   |
//! | access     | `AccessTokenType::Reference` | `Reference`  |
//! | identity   | `ClientSecret`             | `ClientSecret` |
//! | identity   | `Asymmetric`               | `Asymmetric`   |
//! | other      | any                        | error          |

use crate::clock::Clock;
use crate::crypto;
use crate::errors::TokenError;
use crate::models::{AccessTokenType, IdentityTokenSigningKeyType, Token, TokenType};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_token_serialization;
use crate::repositories::ReferenceTokenStore;
use crate::services::key_management_service::SigningCredentialSource;
use chrono::{DateTime, Utc};
use common::jwt::claim_names;
use common::secret::ExposeSecret;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Claims set by the serializer itself; token claims never override them.
const REGISTERED_CLAIMS: [&str; 4] = [
    claim_names::ISSUER,
    claim_names::AUDIENCE,
    claim_names::NOT_BEFORE,
    claim_names::EXPIRATION,
];

/// How a token leaves the issuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenEncoding {
    /// Compact JWT signed with the deployment credential (EdDSA).
    Asymmetric,
    /// Compact JWT signed with the client's shared secret (HS256).
    ClientSecret,
    /// Opaque handle; the token is persisted server-side.
    Reference,
}

impl TokenEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenEncoding::Asymmetric => "asymmetric",
            TokenEncoding::ClientSecret => "client_secret",
            TokenEncoding::Reference => "reference",
        }
    }
}

/// Select the encoding for `token` from its type and client policy.
pub fn select_encoding(token: &Token) -> Result<TokenEncoding, TokenError> {
    let client = token.client();
    match token.token_type() {
        TokenType::Access => match client.access_token_type {
            AccessTokenType::Jwt => Ok(TokenEncoding::Asymmetric),
            AccessTokenType::Reference => Ok(TokenEncoding::Reference),
        },
        TokenType::Identity => match client.identity_token_signing_key_type {
            IdentityTokenSigningKeyType::ClientSecret => Ok(TokenEncoding::ClientSecret),
            IdentityTokenSigningKeyType::Asymmetric => Ok(TokenEncoding::Asymmetric),
        },
        TokenType::Other(other) => Err(TokenError::InvalidTokenType(other.clone())),
    }
}

/// Compact payload: `iss`, `aud`, the validity window `[now, now + lifetime]`,
/// then every claim. Claims sharing a type become a JSON array in order.
pub fn build_payload(token: &Token, now: DateTime<Utc>) -> Map<String, Value> {
    let issued = now.timestamp();
    let lifetime = i64::try_from(token.lifetime()).unwrap_or(i64::MAX);

    let mut payload = Map::new();
    let mut collapsed: HashSet<&str> = HashSet::new();
    payload.insert(claim_names::ISSUER.to_string(), Value::from(token.issuer()));
    payload.insert(claim_names::AUDIENCE.to_string(), Value::from(token.audience()));
    payload.insert(claim_names::NOT_BEFORE.to_string(), Value::from(issued));
    payload.insert(
        claim_names::EXPIRATION.to_string(),
        Value::from(issued.saturating_add(lifetime)),
    );

    for claim in token.claims() {
        if REGISTERED_CLAIMS.contains(&claim.claim_type.as_str()) {
            tracing::debug!(
                target: "token.serializer",
                claim_type = %claim.claim_type,
                "Ignoring claim that shadows a registered claim"
            );
            continue;
        }

        let value = claim.to_json_value();
        match payload.get_mut(&claim.claim_type) {
            // Only arrays built here take further values; a JSON-array claim stays one element
            Some(Value::Array(values)) if collapsed.contains(claim.claim_type.as_str()) => {
                values.push(value);
            }
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
                collapsed.insert(claim.claim_type.as_str());
            }
            None => {
                payload.insert(claim.claim_type.clone(), value);
            }
        }
    }

    payload
}

/// Turns tokens into the strings handed to clients.
#[derive(Clone)]
pub struct TokenSerializer {
    credentials: Arc<dyn SigningCredentialSource>,
    reference_store: Arc<dyn ReferenceTokenStore>,
    clock: Arc<dyn Clock>,
}

impl TokenSerializer {
    pub fn new(
        credentials: Arc<dyn SigningCredentialSource>,
        reference_store: Arc<dyn ReferenceTokenStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            reference_store,
            clock,
        }
    }

    /// Serialize `token` as a compact signed JWT or a reference handle.
    ///
    /// Fails with `InvalidTokenType` for types this issuer does not mint.
    #[instrument(
        skip_all,
        fields(
            client = %hash_for_correlation(&token.client().client_id),
            token_type = %token.token_type(),
            encoding = tracing::field::Empty,
        )
    )]
    pub async fn serialize(&self, token: &Token) -> Result<String, TokenError> {
        let start = Instant::now();

        let encoding = match select_encoding(token) {
            Ok(encoding) => encoding,
            Err(e) => {
                tracing::error!(
                    target: "token.serializer",
                    error = %e,
                    "Refusing to serialize token"
                );
                record_token_serialization("none", "error", Some(e.category()), start.elapsed());
                return Err(e);
            }
        };
        tracing::Span::current().record("encoding", encoding.as_str());

        let result = match encoding {
            TokenEncoding::Asymmetric => self.sign_asymmetric(token).await,
            TokenEncoding::ClientSecret => self.sign_with_client_secret(token),
            TokenEncoding::Reference => self.store_reference(token).await,
        };

        match &result {
            Ok(_) => {
                record_token_serialization(encoding.as_str(), "success", None, start.elapsed());
                tracing::debug!(target: "token.serializer", "Token serialized");
            }
            Err(e) => {
                record_token_serialization(
                    encoding.as_str(),
                    "error",
                    Some(e.category()),
                    start.elapsed(),
                );
                tracing::warn!(
                    target: "token.serializer",
                    error = %e,
                    "Token serialization failed"
                );
            }
        }

        result
    }

    async fn sign_asymmetric(&self, token: &Token) -> Result<String, TokenError> {
        let credential = self.credentials.signing_credential().await?.ok_or_else(|| {
            TokenError::MissingCredential("No signing credential configured".to_string())
        })?;

        let payload = build_payload(token, self.clock.now());
        crypto::sign_eddsa(&payload, credential.private_key_pkcs8(), credential.key_id())
    }

    fn sign_with_client_secret(&self, token: &Token) -> Result<String, TokenError> {
        let secret = token.client().client_secret.as_ref().ok_or_else(|| {
            TokenError::MissingCredential(
                "Client signs identity tokens with its secret but has none".to_string(),
            )
        })?;

        let payload = build_payload(token, self.clock.now());
        crypto::sign_hs256(&payload, secret.expose_secret().as_bytes())
    }

    async fn store_reference(&self, token: &Token) -> Result<String, TokenError> {
        let handle = crypto::generate_handle()?;
        self.reference_store.store(&handle, token).await?;
        Ok(handle)
    }
}
