//! Stub collaborators for the token factory and serializer.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use common::jwt::claim_names;
use std::collections::HashMap;
use token_service::clock::Clock;
use token_service::errors::TokenError;
use token_service::models::{Claim, Subject};
use token_service::services::claims_service::{
    AccessClaimsContext, ClaimsProvider, IdentityClaimsContext, UserLookup,
};

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// 2025-03-01T12:00:00Z
    pub fn default_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
            .single()
            .expect("valid fixed instant")
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self(Self::default_instant())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Profile claims keyed by subject ID.
#[derive(Debug, Clone, Default)]
pub struct StaticUserLookup {
    profiles: HashMap<String, Vec<Claim>>,
}

impl StaticUserLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile_claim(mut self, subject_id: &str, claim: Claim) -> Self {
        self.profiles
            .entry(subject_id.to_string())
            .or_default()
            .push(claim);
        self
    }
}

#[async_trait]
impl UserLookup for StaticUserLookup {
    async fn profile_claims(
        &self,
        subject: &Subject,
        claim_types: &[String],
    ) -> Result<Vec<Claim>, TokenError> {
        Ok(self
            .profiles
            .get(&subject.subject_id)
            .map(|claims| {
                claims
                    .iter()
                    .filter(|c| claim_types.contains(&c.claim_type))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Scope-driven claims provider.
///
/// Identity tokens: `sub`, the subject's authentication claims, any extra
/// claims, and (when all identity claims are requested) the profile claims
/// released by the requested scopes. Access tokens: `sub`, `client_id`, one
/// `scope` claim per requested scope, then extra access claims.
#[derive(Debug, Clone, Default)]
pub struct ScopeClaimsProvider {
    extra_identity_claims: Vec<Claim>,
    extra_access_claims: Vec<Claim>,
}

impl ScopeClaimsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity_claim(mut self, claim: Claim) -> Self {
        self.extra_identity_claims.push(claim);
        self
    }

    pub fn with_access_claim(mut self, claim: Claim) -> Self {
        self.extra_access_claims.push(claim);
        self
    }
}

#[async_trait]
impl ClaimsProvider for ScopeClaimsProvider {
    async fn identity_token_claims(
        &self,
        ctx: IdentityClaimsContext<'_>,
    ) -> Result<Vec<Claim>, TokenError> {
        let mut claims = vec![Claim::new(
            claim_names::SUBJECT,
            ctx.subject.subject_id.clone(),
        )];
        claims.extend(ctx.subject.claims.iter().cloned());
        claims.extend(self.extra_identity_claims.iter().cloned());

        if ctx.include_all_identity_claims {
            let claim_types: Vec<String> = ctx
                .scopes
                .iter()
                .flat_map(|scope| scope.claim_types.iter().cloned())
                .collect();
            claims.extend(
                ctx.user_lookup
                    .profile_claims(ctx.subject, &claim_types)
                    .await?,
            );
        }

        Ok(claims)
    }

    async fn access_token_claims(
        &self,
        ctx: AccessClaimsContext<'_>,
    ) -> Result<Vec<Claim>, TokenError> {
        let mut claims = vec![
            Claim::new(claim_names::SUBJECT, ctx.subject.subject_id.clone()),
            Claim::new(claim_names::CLIENT_ID, ctx.client.client_id.clone()),
        ];
        claims.extend(
            ctx.scopes
                .iter()
                .map(|scope| Claim::new(claim_names::SCOPE, scope.name.clone())),
        );
        claims.extend(self.extra_access_claims.iter().cloned());
        Ok(claims)
    }
}

/// Claims provider that always fails with the given error.
#[derive(Debug, Clone)]
pub struct FailingClaimsProvider(pub TokenError);

#[async_trait]
impl ClaimsProvider for FailingClaimsProvider {
    async fn identity_token_claims(
        &self,
        _ctx: IdentityClaimsContext<'_>,
    ) -> Result<Vec<Claim>, TokenError> {
        Err(self.0.clone())
    }

    async fn access_token_claims(
        &self,
        _ctx: AccessClaimsContext<'_>,
    ) -> Result<Vec<Claim>, TokenError> {
        Err(self.0.clone())
    }
}

/// User lookup that always fails with the given error.
#[derive(Debug, Clone)]
pub struct FailingUserLookup(pub TokenError);

#[async_trait]
impl UserLookup for FailingUserLookup {
    async fn profile_claims(
        &self,
        _subject: &Subject,
        _claim_types: &[String],
    ) -> Result<Vec<Claim>, TokenError> {
        Err(self.0.clone())
    }
}
