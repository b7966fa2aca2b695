//! In-memory store implementations for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use token_service::errors::TokenError;
use token_service::models::{RefreshToken, Token};
use token_service::repositories::{ReferenceTokenStore, RefreshTokenStore};

/// Reference tokens keyed by handle.
#[derive(Debug, Default)]
pub struct InMemoryReferenceTokenStore {
    tokens: Mutex<HashMap<String, Token>>,
}

impl InMemoryReferenceTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, handle: &str) -> Option<Token> {
        self.tokens.lock().await.get(handle).cloned()
    }

    pub async fn len(&self) -> usize {
        self.tokens.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.lock().await.is_empty()
    }
}

#[async_trait]
impl ReferenceTokenStore for InMemoryReferenceTokenStore {
    async fn store(&self, handle: &str, token: &Token) -> Result<(), TokenError> {
        self.tokens
            .lock()
            .await
            .insert(handle.to_string(), token.clone());
        Ok(())
    }
}

/// Refresh token records keyed by handle.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStore {
    records: Mutex<HashMap<String, RefreshToken>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, handle: &str) -> Option<RefreshToken> {
        self.records.lock().await.get(handle).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn store(&self, handle: &str, record: &RefreshToken) -> Result<(), TokenError> {
        self.records
            .lock()
            .await
            .insert(handle.to_string(), record.clone());
        Ok(())
    }
}

/// Store that rejects every write with the given error.
#[derive(Debug, Clone)]
pub struct FailingStore(pub TokenError);

#[async_trait]
impl ReferenceTokenStore for FailingStore {
    async fn store(&self, _handle: &str, _token: &Token) -> Result<(), TokenError> {
        Err(self.0.clone())
    }
}

#[async_trait]
impl RefreshTokenStore for FailingStore {
    async fn store(&self, _handle: &str, _record: &RefreshToken) -> Result<(), TokenError> {
        Err(self.0.clone())
    }
}
