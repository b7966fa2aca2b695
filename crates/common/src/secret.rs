//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate. Use these types
//! for client shared secrets and signing key material.
//!
//! `SecretBox<T>` and `SecretString` implement `Debug` with redaction, so any
//! struct deriving `Debug` that holds one gets safe logging behavior for free.
//! Secrets are zeroized when dropped.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct ClientSecretConfig {
//!     client_id: String,
//!     shared_secret: SecretString,
//! }
//!
//! let cfg = ClientSecretConfig {
//!     client_id: "web-app".to_string(),
//!     shared_secret: SecretString::from("hmac-shared-secret"),
//! };
//!
//! // Safe: the shared secret is redacted
//! println!("{:?}", cfg);
//!
//! // Access requires an explicit call
//! let key: &str = cfg.shared_secret.expose_secret();
//! assert_eq!(key, "hmac-shared-secret");
//! ```
//!
//! # Usage Guidelines
//!
//! Use `SecretString` for:
//! - OAuth client shared secrets (HMAC identity token signing)
//!
//! Use `SecretBox<T>` for:
//! - Binary key material (e.g., `SecretBox<Vec<u8>>` for PKCS#8 documents)

// Re-export the main types from secrecy
pub use secrecy::{ExposeSecret, SecretBox, SecretString};
