use crate::config::ClientLifetimes;
use chrono::{DateTime, Duration, Utc};
use common::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// ============================================================================
// Token types
// ============================================================================

/// The kind of token a [`Token`] represents.
///
/// Only `Identity` and `Access` are minted by this crate. `Other` carries a
/// type string that came from elsewhere (e.g. a stored token written by a
/// different issuer version) and is rejected by the serializer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TokenType {
    Identity,
    Access,
    Other(String),
}

impl TokenType {
    pub fn as_str(&self) -> &str {
        match self {
            TokenType::Identity => "id_token",
            TokenType::Access => "access_token",
            TokenType::Other(s) => s,
        }
    }
}

impl From<&str> for TokenType {
    fn from(s: &str) -> Self {
        match s {
            "id_token" => TokenType::Identity,
            "access_token" => TokenType::Access,
            other => TokenType::Other(other.to_string()),
        }
    }
}

impl From<String> for TokenType {
    fn from(s: String) -> Self {
        TokenType::from(s.as_str())
    }
}

impl From<TokenType> for String {
    fn from(t: TokenType) -> Self {
        t.as_str().to_string()
    }
}

impl FromStr for TokenType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TokenType::from(s))
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key used to sign a client's identity tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityTokenSigningKeyType {
    /// HMAC (HS256) keyed with the client's shared secret.
    ClientSecret,
    /// The deployment-wide asymmetric signing credential.
    Asymmetric,
}

/// How a client's access tokens leave the issuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTokenType {
    /// Self-contained signed token.
    Jwt,
    /// Opaque handle; the token stays server-side.
    Reference,
}

// ============================================================================
// Claims
// ============================================================================

/// How a claim's string value is rendered into a token payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClaimValueType {
    #[default]
    String,
    Integer,
    Boolean,
    Json,
}

/// A single `(type, value)` claim with a value type hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
    #[serde(default)]
    pub value_type: ClaimValueType,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
            value_type: ClaimValueType::String,
        }
    }

    pub fn integer(claim_type: impl Into<String>, value: i64) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.to_string(),
            value_type: ClaimValueType::Integer,
        }
    }

    pub fn with_value_type(mut self, value_type: ClaimValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Claim identity: two claims are duplicates when type and value match,
    /// regardless of the value type hint.
    pub fn same_pair(&self, other: &Claim) -> bool {
        self.claim_type == other.claim_type && self.value == other.value
    }

    /// JSON rendering used in signed token payloads. Values that do not parse
    /// as their hinted type fall back to a JSON string.
    pub fn to_json_value(&self) -> serde_json::Value {
        let fallback = || serde_json::Value::String(self.value.clone());
        match self.value_type {
            ClaimValueType::String => fallback(),
            ClaimValueType::Integer => self
                .value
                .parse::<i64>()
                .map(serde_json::Value::from)
                .unwrap_or_else(|_| fallback()),
            ClaimValueType::Boolean => self
                .value
                .parse::<bool>()
                .map(serde_json::Value::Bool)
                .unwrap_or_else(|_| fallback()),
            ClaimValueType::Json => {
                serde_json::from_str(&self.value).unwrap_or_else(|_| fallback())
            }
        }
    }
}

// ============================================================================
// Clients, subjects, scopes, requests
// ============================================================================

/// A registered relying party and its token policy.
#[derive(Debug, Clone)]
pub struct Client {
    pub client_id: String,
    pub identity_token_lifetime: u64,
    pub access_token_lifetime: u64,
    pub refresh_token_lifetime: u64,
    pub identity_token_signing_key_type: IdentityTokenSigningKeyType,
    pub access_token_type: AccessTokenType,
    /// Only used when `identity_token_signing_key_type` is `ClientSecret`.
    pub client_secret: Option<SecretString>,
}

impl Client {
    /// Client with default lifetimes, asymmetric identity tokens and JWT access tokens.
    pub fn new(client_id: impl Into<String>) -> Self {
        let lifetimes = ClientLifetimes::default();
        Self {
            client_id: client_id.into(),
            identity_token_lifetime: lifetimes.identity_token,
            access_token_lifetime: lifetimes.access_token,
            refresh_token_lifetime: lifetimes.refresh_token,
            identity_token_signing_key_type: IdentityTokenSigningKeyType::Asymmetric,
            access_token_type: AccessTokenType::Jwt,
            client_secret: None,
        }
    }

    pub fn with_lifetimes(mut self, lifetimes: ClientLifetimes) -> Self {
        self.identity_token_lifetime = lifetimes.identity_token;
        self.access_token_lifetime = lifetimes.access_token;
        self.refresh_token_lifetime = lifetimes.refresh_token;
        self
    }

    pub fn with_identity_token_signing(mut self, key_type: IdentityTokenSigningKeyType) -> Self {
        self.identity_token_signing_key_type = key_type;
        self
    }

    pub fn with_access_token_type(mut self, access_token_type: AccessTokenType) -> Self {
        self.access_token_type = access_token_type;
        self
    }

    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::from(secret.into()));
        self
    }
}

/// The authenticated end user (or client, for client credentials).
///
/// The subject identifier is redacted in Debug output.
#[derive(Clone)]
pub struct Subject {
    pub subject_id: String,
    /// Authentication claims (e.g. `amr`, `auth_time`, `idp`).
    pub claims: Vec<Claim>,
}

impl Subject {
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            claims: Vec::new(),
        }
    }

    pub fn with_claim(mut self, claim: Claim) -> Self {
        self.claims.push(claim);
        self
    }
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("subject_id", &"[REDACTED]")
            .field("claims", &self.claims.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// Grants identity (user profile) claims.
    Identity,
    /// Grants access to a protected resource.
    Resource,
}

/// A requested and consented scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub name: String,
    pub kind: ScopeKind,
    /// Claim types this scope releases.
    #[serde(default)]
    pub claim_types: Vec<String>,
}

impl Scope {
    pub fn identity(name: impl Into<String>, claim_types: &[&str]) -> Self {
        Self {
            name: name.into(),
            kind: ScopeKind::Identity,
            claim_types: claim_types.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn resource(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ScopeKind::Resource,
            claim_types: Vec::new(),
        }
    }
}

/// Raw authorization/token request parameters, as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParameters {
    params: HashMap<String, String>,
}

impl RequestParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The `nonce` parameter, when present.
    pub fn nonce(&self) -> Option<&str> {
        self.get(common::jwt::claim_names::NONCE)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Everything the token factory needs for one issuance call.
#[derive(Debug, Clone)]
pub struct TokenCreationRequest {
    pub subject: Subject,
    pub client: Arc<Client>,
    pub scopes: Vec<Scope>,
    pub include_all_identity_claims: bool,
    pub request: RequestParameters,
    /// Access token string to bind via `at_hash` (hybrid flow).
    pub access_token_to_hash: Option<String>,
}

impl TokenCreationRequest {
    pub fn new(subject: Subject, client: Arc<Client>) -> Self {
        Self {
            subject,
            client,
            scopes: Vec::new(),
            include_all_identity_claims: false,
            request: RequestParameters::default(),
            access_token_to_hash: None,
        }
    }

    pub fn with_scopes(mut self, scopes: Vec<Scope>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_request(mut self, request: RequestParameters) -> Self {
        self.request = request;
        self
    }

    pub fn include_all_identity_claims(mut self, include_all: bool) -> Self {
        self.include_all_identity_claims = include_all;
        self
    }

    pub fn with_access_token_to_hash(mut self, access_token: impl Into<String>) -> Self {
        self.access_token_to_hash = Some(access_token.into());
        self
    }
}

// ============================================================================
// Tokens
// ============================================================================

/// An issued identity or access token, prior to serialization.
///
/// Tokens are immutable: fields are only reachable through accessors.
#[derive(Debug, Clone)]
pub struct Token {
    token_type: TokenType,
    issuer: String,
    audience: String,
    lifetime: u64,
    claims: Vec<Claim>,
    client: Arc<Client>,
}

impl Token {
    pub fn new(
        token_type: TokenType,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        lifetime: u64,
        claims: Vec<Claim>,
        client: Arc<Client>,
    ) -> Self {
        Self {
            token_type,
            issuer: issuer.into(),
            audience: audience.into(),
            lifetime,
            claims,
            client,
        }
    }

    pub fn token_type(&self) -> &TokenType {
        &self.token_type
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Lifetime in seconds.
    pub fn lifetime(&self) -> u64 {
        self.lifetime
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// All claims of the given type, in order.
    pub fn claims_of_type<'a>(&'a self, claim_type: &'a str) -> impl Iterator<Item = &'a Claim> {
        self.claims
            .iter()
            .filter(move |c| c.claim_type == claim_type)
    }

    /// Value of the first claim of the given type.
    pub fn claim_value(&self, claim_type: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }
}

/// A persisted refresh token record.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub handle: String,
    pub client_id: String,
    pub creation_time: DateTime<Utc>,
    /// Lifetime in seconds.
    pub lifetime: u64,
    /// Snapshot of the access token this refresh token was issued alongside.
    pub access_token: Token,
}

impl RefreshToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        let lifetime = i64::try_from(self.lifetime).unwrap_or(i64::MAX);
        self.creation_time
            .checked_add_signed(Duration::seconds(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}
