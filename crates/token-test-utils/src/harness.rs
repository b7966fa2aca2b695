//! Fully wired issuer for integration tests.

use crate::collaborators::{FixedClock, ScopeClaimsProvider, StaticUserLookup};
use crate::crypto_fixtures::{public_key_bytes, test_signing_credential, test_signing_key};
use crate::stores::{InMemoryReferenceTokenStore, InMemoryRefreshTokenStore};
use crate::test_ids::*;
use std::sync::Arc;
use token_service::clock::Clock;
use token_service::config::Settings;
use token_service::models::Claim;
use token_service::repositories::{ReferenceTokenStore, RefreshTokenStore};
use token_service::services::claims_service::{ClaimsProvider, UserLookup};
use token_service::services::key_management_service::{
    SigningCredentialSource, StaticSigningCredentialSource,
};
use token_service::{RefreshTokenIssuer, TokenFactory, TokenSerializer, TokenService};

/// Seed of the deterministic deployment key used by [`TestIssuer`].
pub const TEST_SIGNING_KEY_SEED: u8 = 1;

/// Factory, serializer and refresh issuer sharing in-memory collaborators.
pub struct TestIssuer {
    pub clock: FixedClock,
    pub reference_store: Arc<InMemoryReferenceTokenStore>,
    pub refresh_store: Arc<InMemoryRefreshTokenStore>,
    pub factory: TokenFactory,
    pub serializer: TokenSerializer,
    pub refresh_issuer: RefreshTokenIssuer,
    pub service: TokenService,
    /// Raw Ed25519 public key for `DecodingKey::from_ed_der`.
    pub public_key: Vec<u8>,
}

impl TestIssuer {
    /// Issuer at [`TEST_ISSUER`], deterministic key [`TEST_KEY_ID_1`], scope
    /// claims provider, and Alice's email on file.
    pub fn new() -> Self {
        TestIssuerBuilder::new().build()
    }

    pub fn builder() -> TestIssuerBuilder {
        TestIssuerBuilder::new()
    }
}

impl Default for TestIssuer {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TestIssuerBuilder {
    issuer: String,
    clock: FixedClock,
    claims_provider: Arc<dyn ClaimsProvider>,
    user_lookup: Arc<dyn UserLookup>,
    credentials: Option<Arc<dyn SigningCredentialSource>>,
    reference_store_override: Option<Arc<dyn ReferenceTokenStore>>,
    refresh_store_override: Option<Arc<dyn RefreshTokenStore>>,
}

impl TestIssuerBuilder {
    pub fn new() -> Self {
        let alice = TEST_SUBJECT_ALICE.to_string();
        Self {
            issuer: TEST_ISSUER.to_string(),
            clock: FixedClock::default(),
            claims_provider: Arc::new(ScopeClaimsProvider::new()),
            user_lookup: Arc::new(
                StaticUserLookup::new()
                    .with_profile_claim(&alice, Claim::new("email", TEST_EMAIL_ALICE))
                    .with_profile_claim(&alice, Claim::new("email_verified", "true")),
            ),
            credentials: None,
            reference_store_override: None,
            refresh_store_override: None,
        }
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.issuer = issuer.to_string();
        self
    }

    pub fn with_clock(mut self, clock: FixedClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_claims_provider(mut self, provider: Arc<dyn ClaimsProvider>) -> Self {
        self.claims_provider = provider;
        self
    }

    pub fn with_user_lookup(mut self, lookup: Arc<dyn UserLookup>) -> Self {
        self.user_lookup = lookup;
        self
    }

    /// No deployment signing credential.
    pub fn without_signing_credential(mut self) -> Self {
        self.credentials = Some(Arc::new(StaticSigningCredentialSource::empty()));
        self
    }

    /// Route reference token writes to `store` instead of the in-memory store.
    pub fn with_reference_store(mut self, store: Arc<dyn ReferenceTokenStore>) -> Self {
        self.reference_store_override = Some(store);
        self
    }

    /// Route refresh token writes to `store` instead of the in-memory store.
    pub fn with_refresh_store(mut self, store: Arc<dyn RefreshTokenStore>) -> Self {
        self.refresh_store_override = Some(store);
        self
    }

    pub fn build(self) -> TestIssuer {
        let settings = Arc::new(Settings::new(self.issuer));
        let clock: Arc<dyn Clock> = Arc::new(self.clock);

        let (public_pem, _) =
            test_signing_key(TEST_SIGNING_KEY_SEED).expect("deterministic key fixture");
        let credentials: Arc<dyn SigningCredentialSource> = match self.credentials {
            Some(credentials) => credentials,
            None => {
                let credential = test_signing_credential(TEST_SIGNING_KEY_SEED, TEST_KEY_ID_1)
                    .expect("deterministic credential fixture");
                Arc::new(StaticSigningCredentialSource::new(credential))
            }
        };

        let reference_store = Arc::new(InMemoryReferenceTokenStore::new());
        let refresh_store = Arc::new(InMemoryRefreshTokenStore::new());
        let reference_target: Arc<dyn ReferenceTokenStore> = self
            .reference_store_override
            .unwrap_or_else(|| reference_store.clone() as Arc<dyn ReferenceTokenStore>);
        let refresh_target: Arc<dyn RefreshTokenStore> = self
            .refresh_store_override
            .unwrap_or_else(|| refresh_store.clone() as Arc<dyn RefreshTokenStore>);

        let factory = TokenFactory::new(
            settings,
            self.claims_provider,
            self.user_lookup,
            Arc::clone(&clock),
        );
        let serializer = TokenSerializer::new(credentials, reference_target, Arc::clone(&clock));
        let refresh_issuer = RefreshTokenIssuer::new(refresh_target, clock);
        let service = TokenService::new(
            factory.clone(),
            serializer.clone(),
            refresh_issuer.clone(),
        );

        TestIssuer {
            clock: self.clock,
            reference_store,
            refresh_store,
            factory,
            serializer,
            refresh_issuer,
            service,
            public_key: public_key_bytes(&public_pem).expect("fixture PEM decodes"),
        }
    }
}

impl Default for TestIssuerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
