use thiserror::Error;

/// Errors produced by token issuance and serialization.
///
/// Collaborators (claims providers, user lookup, stores, credential sources)
/// report failures with the variant that names them. The core never rewraps
/// or retries; a collaborator error reaches the caller exactly as produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Claims provider error: {0}")]
    ClaimsProvider(String),

    #[error("User lookup error: {0}")]
    UserLookup(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Invalid token type: {0}")]
    InvalidTokenType(String),

    #[error("Missing signing credential: {0}")]
    MissingCredential(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),
}

impl TokenError {
    /// Bounded label for metrics.
    pub fn category(&self) -> &'static str {
        match self {
            TokenError::ClaimsProvider(_) | TokenError::UserLookup(_) => "claims",
            TokenError::Store(_) => "store",
            TokenError::Signing(_) | TokenError::Crypto(_) => "cryptographic",
            TokenError::InvalidTokenType(_) => "invalid_token_type",
            TokenError::MissingCredential(_) => "configuration",
        }
    }
}
