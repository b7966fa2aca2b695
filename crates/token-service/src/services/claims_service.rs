//! Claim assembly for identity and access tokens.
//!
//! Identity tokens get the protocol claims (`nonce`, `iat`, `at_hash`) ahead
//! of provider claims, then the whole set is deduplicated by `(type, value)`.
//! Access token claims come from the provider alone.

use crate::config::Settings;
use crate::crypto;
use crate::errors::TokenError;
use crate::models::{Claim, Client, RequestParameters, Scope, Subject};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::jwt::claim_names;

/// Resolves profile data for a subject.
///
/// Opaque to the issuer; it is only handed through to the [`ClaimsProvider`].
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Profile claims of the requested types. Unknown types are skipped.
    async fn profile_claims(
        &self,
        subject: &Subject,
        claim_types: &[String],
    ) -> Result<Vec<Claim>, TokenError>;
}

/// Inputs for identity token claim enrichment.
#[derive(Clone, Copy)]
pub struct IdentityClaimsContext<'a> {
    pub subject: &'a Subject,
    pub client: &'a Client,
    pub scopes: &'a [Scope],
    pub settings: &'a Settings,
    pub include_all_identity_claims: bool,
    pub user_lookup: &'a dyn UserLookup,
    pub request: &'a RequestParameters,
}

/// Inputs for access token claim enrichment.
#[derive(Clone, Copy)]
pub struct AccessClaimsContext<'a> {
    pub subject: &'a Subject,
    pub client: &'a Client,
    pub scopes: &'a [Scope],
    pub settings: &'a Settings,
    pub user_lookup: &'a dyn UserLookup,
    pub request: &'a RequestParameters,
}

/// Pluggable claim enrichment (scope-to-claim resolution).
///
/// Failures are returned to the caller as produced.
#[async_trait]
pub trait ClaimsProvider: Send + Sync {
    async fn identity_token_claims(
        &self,
        ctx: IdentityClaimsContext<'_>,
    ) -> Result<Vec<Claim>, TokenError>;

    async fn access_token_claims(
        &self,
        ctx: AccessClaimsContext<'_>,
    ) -> Result<Vec<Claim>, TokenError>;
}

/// Claims for an identity token.
///
/// Protocol claims come first so that a provider repeating one of them is
/// collapsed onto the locally computed value.
pub async fn identity_token_claims(
    provider: &dyn ClaimsProvider,
    ctx: IdentityClaimsContext<'_>,
    access_token_to_hash: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Vec<Claim>, TokenError> {
    let mut claims = Vec::new();

    if let Some(nonce) = ctx.request.nonce() {
        claims.push(Claim::new(claim_names::NONCE, nonce));
    }

    claims.push(Claim::integer(claim_names::ISSUED_AT, now.timestamp()));

    if let Some(access_token) = access_token_to_hash {
        claims.push(Claim::new(
            claim_names::ACCESS_TOKEN_HASH,
            crypto::access_token_hash(access_token),
        ));
    }

    claims.extend(provider.identity_token_claims(ctx).await?);

    Ok(dedup_claims(claims))
}

/// Claims for an access token, exactly as the provider returns them.
pub async fn access_token_claims(
    provider: &dyn ClaimsProvider,
    ctx: AccessClaimsContext<'_>,
) -> Result<Vec<Claim>, TokenError> {
    provider.access_token_claims(ctx).await
}

/// Drop repeated `(type, value)` pairs, keeping the first occurrence.
pub fn dedup_claims(claims: Vec<Claim>) -> Vec<Claim> {
    let mut unique: Vec<Claim> = Vec::with_capacity(claims.len());
    for claim in claims {
        if !unique.iter().any(|seen| seen.same_pair(&claim)) {
            unique.push(claim);
        }
    }
    unique
}
