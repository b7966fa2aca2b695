//! Fixed test IDs for deterministic tests
//!
//! All test IDs are deterministic to ensure reproducible test results.

use uuid::Uuid;

// Issuer
pub const TEST_ISSUER: &str = "https://idp.example.com";
pub const TEST_RESOURCE_AUDIENCE: &str = "https://idp.example.com/resources";

// Subject IDs (100-199)
pub const TEST_SUBJECT_ALICE: Uuid = Uuid::from_u128(100);
pub const TEST_SUBJECT_BOB: Uuid = Uuid::from_u128(101);

// Signing Key IDs
pub const TEST_KEY_ID_1: &str = "test-key-2025-01";
pub const TEST_KEY_ID_2: &str = "test-key-2025-02";

// Client IDs
pub const TEST_CLIENT_ID_WEB: &str = "web-test-client";
pub const TEST_CLIENT_ID_MOBILE: &str = "mobile-test-client";

// Client shared secret (HS256 identity tokens)
pub const TEST_CLIENT_SECRET: &str = "test-secret-do-not-use-in-production";

// Request parameters
pub const TEST_NONCE: &str = "n-0S6_WzA2Mj";

// Scopes
pub const SCOPE_OPENID: &str = "openid";
pub const SCOPE_EMAIL: &str = "email";
pub const SCOPE_API_READ: &str = "api.read";

// Profile data served by the stub user lookup
pub const TEST_EMAIL_ALICE: &str = "alice@example.com";
