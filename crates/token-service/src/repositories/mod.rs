//! Persistence boundary.
//!
//! The issuer writes two kinds of records: reference tokens (the full token,
//! keyed by the opaque handle handed to the client) and refresh tokens. Store
//! implementations live outside this crate; both traits accept writes keyed by
//! caller-supplied handles and report failures as `TokenError::Store`.

use crate::errors::TokenError;
use crate::models::{RefreshToken, Token};
use async_trait::async_trait;

/// Server-side storage for access tokens issued by reference.
#[async_trait]
pub trait ReferenceTokenStore: Send + Sync {
    /// Persist `token` under `handle` for later resolution by resource servers.
    async fn store(&self, handle: &str, token: &Token) -> Result<(), TokenError>;
}

/// Storage for refresh token records awaiting redemption.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Persist `record` under `handle`.
    async fn store(&self, handle: &str, record: &RefreshToken) -> Result<(), TokenError>;
}
