//! # Token Test Utilities
//!
//! Shared test utilities for the token issuance core.
//!
//! This crate provides:
//! - Deterministic crypto fixtures (fixed Ed25519 keys for reproducible tests)
//! - Fixed test IDs (issuer, clients, subjects, secrets)
//! - Builders for clients and token creation requests
//! - Stub collaborators (claims provider, user lookup, clock)
//! - In-memory reference and refresh token stores
//! - Custom assertions (`TokenAssertions` trait) for compact tokens
//!
//! ## Usage
//!
//! ```rust,ignore
//! use token_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let harness = TestIssuer::new();
//!     let request = TestRequestBuilder::new().with_nonce(TEST_NONCE).build();
//!
//!     let token = harness.factory.create_identity_token(&request).await?;
//!     let jwt = harness.serializer.serialize(&token).await?;
//!
//!     jwt.assert_valid_jwt()
//!         .assert_audience(TEST_CLIENT_ID_WEB)
//!         .assert_claim("nonce", TEST_NONCE);
//! }
//! ```

pub mod assertions;
pub mod builders;
pub mod collaborators;
pub mod crypto_fixtures;
pub mod harness;
pub mod stores;
pub mod test_ids;

// Re-export commonly used items
pub use assertions::*;
pub use builders::*;
pub use collaborators::*;
pub use crypto_fixtures::*;
pub use harness::*;
pub use stores::*;
pub use test_ids::*;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test subscriber once per process. Honors `RUST_LOG`.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "token=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}
