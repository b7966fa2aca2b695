//! Deployment signing credentials.
//!
//! Rotation and storage of keys belong to the deployment; the issuer only asks
//! a [`SigningCredentialSource`] for the credential currently in force.

use crate::config::Settings;
use crate::crypto;
use crate::errors::TokenError;
use async_trait::async_trait;
use common::secret::{ExposeSecret, SecretBox};
use std::fmt;

/// The deployment-wide asymmetric signing credential (Ed25519).
pub struct SigningCredential {
    key_id: String,
    private_key_pkcs8: SecretBox<Vec<u8>>,
}

impl SigningCredential {
    /// Build a credential from a PKCS#8 Ed25519 private key.
    pub fn from_pkcs8(
        key_id: impl Into<String>,
        private_key_pkcs8: Vec<u8>,
    ) -> Result<Self, TokenError> {
        // Rejects anything ring cannot load as an Ed25519 key
        crypto::public_key_pem(&private_key_pkcs8)?;

        Ok(Self {
            key_id: key_id.into(),
            private_key_pkcs8: SecretBox::new(Box::new(private_key_pkcs8)),
        })
    }

    /// Freshly generated credential.
    pub fn generate(key_id: impl Into<String>) -> Result<Self, TokenError> {
        let (_, private_key_pkcs8) = crypto::generate_signing_key()?;
        Self::from_pkcs8(key_id, private_key_pkcs8)
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn public_key_pem(&self) -> Result<String, TokenError> {
        crypto::public_key_pem(self.private_key_pkcs8.expose_secret())
    }

    pub(crate) fn private_key_pkcs8(&self) -> &[u8] {
        self.private_key_pkcs8.expose_secret()
    }
}

impl Clone for SigningCredential {
    fn clone(&self) -> Self {
        Self {
            key_id: self.key_id.clone(),
            private_key_pkcs8: SecretBox::new(Box::new(
                self.private_key_pkcs8.expose_secret().clone(),
            )),
        }
    }
}

impl fmt::Debug for SigningCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCredential")
            .field("key_id", &self.key_id)
            .field("private_key_pkcs8", &"[REDACTED]")
            .finish()
    }
}

/// Supplies the signing credential currently in force.
#[async_trait]
pub trait SigningCredentialSource: Send + Sync {
    /// `Ok(None)` means no credential is configured.
    async fn signing_credential(&self) -> Result<Option<SigningCredential>, TokenError>;
}

/// A credential fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticSigningCredentialSource {
    credential: Option<SigningCredential>,
}

impl StaticSigningCredentialSource {
    pub fn new(credential: SigningCredential) -> Self {
        Self {
            credential: Some(credential),
        }
    }

    /// Source with no credential; asymmetric signing fails with `MissingCredential`.
    pub fn empty() -> Self {
        Self { credential: None }
    }

    /// Credential from `OIDC_SIGNING_KEY` / `OIDC_SIGNING_KEY_ID`, if configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, TokenError> {
        let credential = settings
            .signing_key_der()
            .map(|der| SigningCredential::from_pkcs8(settings.signing_key_id.clone(), der))
            .transpose()?;

        if credential.is_none() {
            tracing::warn!(
                target: "token.keys",
                "No signing key configured; asymmetric signing is unavailable"
            );
        }

        Ok(Self { credential })
    }
}

#[async_trait]
impl SigningCredentialSource for StaticSigningCredentialSource {
    async fn signing_credential(&self) -> Result<Option<SigningCredential>, TokenError> {
        Ok(self.credential.clone())
    }
}
