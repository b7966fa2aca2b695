use base64::{engine::general_purpose, Engine as _};
use common::secret::{ExposeSecret, SecretBox};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Suffix appended to the issuer URI to form the access token audience.
pub const ACCESS_TOKEN_AUDIENCE_SUFFIX: &str = "/resources";

/// Default key ID placed in the `kid` header of asymmetrically signed tokens.
pub const DEFAULT_SIGNING_KEY_ID: &str = "default";

/// Default identity token lifetime (6 minutes).
pub const DEFAULT_IDENTITY_TOKEN_LIFETIME_SECONDS: u64 = 360;

/// Default access token lifetime (1 hour).
pub const DEFAULT_ACCESS_TOKEN_LIFETIME_SECONDS: u64 = 3600;

/// Default refresh token lifetime (30 days).
pub const DEFAULT_REFRESH_TOKEN_LIFETIME_SECONDS: u64 = 30 * 24 * 3600;

/// Upper bound for any configured lifetime (1 year).
pub const MAX_TOKEN_LIFETIME_SECONDS: u64 = 365 * 24 * 3600;

/// Per-token-type lifetimes, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientLifetimes {
    pub identity_token: u64,
    pub access_token: u64,
    pub refresh_token: u64,
}

impl Default for ClientLifetimes {
    fn default() -> Self {
        Self {
            identity_token: DEFAULT_IDENTITY_TOKEN_LIFETIME_SECONDS,
            access_token: DEFAULT_ACCESS_TOKEN_LIFETIME_SECONDS,
            refresh_token: DEFAULT_REFRESH_TOKEN_LIFETIME_SECONDS,
        }
    }
}

/// Issuer settings shared by every token the deployment mints.
pub struct Settings {
    pub issuer_uri: String,
    /// Ed25519 private key (PKCS#8 DER) for the deployment-wide signing credential.
    pub signing_key: Option<SecretBox<Vec<u8>>>,
    pub signing_key_id: String,
    /// Lifetimes applied to clients built from this configuration.
    pub client_lifetimes: ClientLifetimes,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("issuer_uri", &self.issuer_uri)
            .field(
                "signing_key",
                &self.signing_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("signing_key_id", &self.signing_key_id)
            .field("client_lifetimes", &self.client_lifetimes)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid issuer URI: {0}")]
    InvalidIssuerUri(String),

    #[error("Invalid lifetime for {name}: {reason}")]
    InvalidLifetime { name: String, reason: String },

    #[error("Invalid signing key: {0}")]
    InvalidSigningKey(String),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),
}

impl Settings {
    /// Settings for an issuer with no configured signing key.
    pub fn new(issuer_uri: impl Into<String>) -> Self {
        Self {
            issuer_uri: issuer_uri.into(),
            signing_key: None,
            signing_key_id: DEFAULT_SIGNING_KEY_ID.to_string(),
            client_lifetimes: ClientLifetimes::default(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let issuer_uri = vars
            .get("OIDC_ISSUER_URI")
            .ok_or_else(|| ConfigError::MissingEnvVar("OIDC_ISSUER_URI".to_string()))?
            .clone();
        validate_issuer_uri(&issuer_uri)?;

        let signing_key = match vars.get("OIDC_SIGNING_KEY") {
            Some(encoded) => {
                let der = general_purpose::STANDARD
                    .decode(encoded)
                    .map_err(ConfigError::Base64Error)?;
                ring::signature::Ed25519KeyPair::from_pkcs8(&der)
                    .map_err(|e| ConfigError::InvalidSigningKey(format!("{}", e)))?;
                Some(SecretBox::new(Box::new(der)))
            }
            None => None,
        };

        let signing_key_id = vars
            .get("OIDC_SIGNING_KEY_ID")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SIGNING_KEY_ID.to_string());

        let client_lifetimes = ClientLifetimes {
            identity_token: parse_lifetime(
                vars,
                "OIDC_DEFAULT_IDENTITY_TOKEN_LIFETIME",
                DEFAULT_IDENTITY_TOKEN_LIFETIME_SECONDS,
            )?,
            access_token: parse_lifetime(
                vars,
                "OIDC_DEFAULT_ACCESS_TOKEN_LIFETIME",
                DEFAULT_ACCESS_TOKEN_LIFETIME_SECONDS,
            )?,
            refresh_token: parse_lifetime(
                vars,
                "OIDC_DEFAULT_REFRESH_TOKEN_LIFETIME",
                DEFAULT_REFRESH_TOKEN_LIFETIME_SECONDS,
            )?,
        };

        Ok(Settings {
            issuer_uri,
            signing_key,
            signing_key_id,
            client_lifetimes,
        })
    }

    /// Audience of every access token: the issuer's resource namespace.
    pub fn access_token_audience(&self) -> String {
        format!(
            "{}{}",
            self.issuer_uri.trim_end_matches('/'),
            ACCESS_TOKEN_AUDIENCE_SUFFIX
        )
    }

    /// Copy of the configured signing key bytes, if any.
    pub(crate) fn signing_key_der(&self) -> Option<Vec<u8>> {
        self.signing_key
            .as_ref()
            .map(|key| key.expose_secret().clone())
    }
}

fn validate_issuer_uri(uri: &str) -> Result<(), ConfigError> {
    let rest = uri
        .strip_prefix("https://")
        .or_else(|| uri.strip_prefix("http://"))
        .ok_or_else(|| ConfigError::InvalidIssuerUri(format!("{} is not an http(s) URI", uri)))?;

    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err(ConfigError::InvalidIssuerUri(format!(
            "{} has no host",
            uri
        )));
    }
    if uri.contains('?') || uri.contains('#') {
        return Err(ConfigError::InvalidIssuerUri(format!(
            "{} must not contain a query or fragment",
            uri
        )));
    }

    Ok(())
}

fn parse_lifetime(
    vars: &HashMap<String, String>,
    name: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(raw) = vars.get(name) else {
        return Ok(default);
    };

    let seconds: u64 = raw.parse().map_err(|e| ConfigError::InvalidLifetime {
        name: name.to_string(),
        reason: format!("{}", e),
    })?;

    if seconds == 0 || seconds > MAX_TOKEN_LIFETIME_SECONDS {
        return Err(ConfigError::InvalidLifetime {
            name: name.to_string(),
            reason: format!(
                "{} is outside 1..={} seconds",
                seconds, MAX_TOKEN_LIFETIME_SECONDS
            ),
        });
    }

    Ok(seconds)
}
