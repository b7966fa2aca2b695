//! OpenID Connect token issuance core
//!
//! Builds identity tokens, access tokens and refresh token records, and
//! serializes tokens as signed compact JWTs or opaque reference handles.
//!
//! # Modules
//!
//! - `clock` - Injected time source
//! - `config` - Issuer configuration
//! - `crypto` - Signing, handles and `at_hash`
//! - `errors` - Error types
//! - `models` - Tokens, clients, claims and requests
//! - `observability` - Correlation hashing and metrics
//! - `repositories` - Reference and refresh token store boundaries
//! - `services` - Claims assembly, token factory, serializer, refresh issuer

pub mod clock;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod services;

pub use clock::{Clock, SystemClock};
pub use config::Settings;
pub use errors::TokenError;
pub use models::{Claim, Client, RefreshToken, Token, TokenCreationRequest, TokenType};
pub use services::refresh_token_service::RefreshTokenIssuer;
pub use services::token_factory::TokenFactory;
pub use services::token_serializer::TokenSerializer;
pub use services::token_service::TokenService;
