//! Unified client surface for bulk credential leak checking.
//!
//! Re-exports the layered API and provides [`build_service`], which wires
//! the HTTP lookup stack from configuration. Callers supply the two
//! collaborators this library deliberately does not implement: an identity
//! provider handing out OAuth access tokens and a cipher turning credentials
//! into lookup payloads.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # fn collaborators() -> (Arc<dyn leakcheck_client::AccessTokenProvider>,
//! #                        Arc<dyn leakcheck_client::CredentialCipher>) { unimplemented!() }
//! let config = leakcheck_client::load_config().expect("config");
//! let (token_provider, cipher) = collaborators();
//! let service = leakcheck_client::build_service(&config, token_provider, cipher)
//!     .expect("service");
//! service.check_username_password_pairs(vec![
//!     leakcheck_client::LeakCheckCredential::new("alice", "f00b4r"),
//! ]);
//! ```

mod builder;

pub use builder::build_service;

pub use leakcheck_core::{Config, CoreError, DetectionConfig, GlobalConfig, load_config, logging};

pub use leakcheck_detection::{
    AccessToken, AccessTokenProvider, BulkLeakCheck, BulkLeakCheckDelegate, BulkLeakCheckImpl,
    CipherError, CredentialCipher, HttpLeakDetectionRequest, HttpLeakDetectionRequestFactory,
    IsLeaked, LeakCheckCredential, LeakDetectionCheckFactory, LeakDetectionCheckFactoryImpl,
    LeakDetectionError, LeakDetectionRequest, LeakDetectionRequestFactory,
    LookupSingleLeakPayload, TokenError, canonicalize_username,
};

pub use leakcheck_service::{BulkLeakCheckService, Observer, State};

pub use leakcheck_bridge::{
    BULK_LEAK_CHECK_DATA_KEY, BulkLeakCheckData, BulkLeakCheckServiceAdapter, CompromiseType,
    CompromisedCredentials, CompromisedCredentialsObserver, CompromisedCredentialsProvider,
    CompromisedCredentialsStore, CompromisedCredentialsStoreObserver, CredentialWithPassword,
    PasswordForm, SavedPasswordsObserver, SavedPasswordsPresenter,
};
