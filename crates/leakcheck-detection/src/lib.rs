//! Credential leak detection: value types, username canonicalization, the
//! network lookup client and the per-batch bulk check orchestrator.
//!
//! The orchestration layer is intentionally ignorant of where credentials
//! come from. Callers submit [`LeakCheckCredential`]s, collaborators supply
//! identity ([`AccessTokenProvider`]) and payload construction
//! ([`CredentialCipher`]), and outcomes flow back through a
//! [`BulkLeakCheckDelegate`].

mod bulk_check;
mod canonicalize;
mod cipher;
mod credential;
mod error;
mod factory;
mod request;
mod token;

pub use bulk_check::{BulkLeakCheck, BulkLeakCheckDelegate, BulkLeakCheckImpl};
pub use canonicalize::canonicalize_username;
pub use cipher::{CipherError, CredentialCipher, LookupSingleLeakPayload};
pub use credential::{IsLeaked, LeakCheckCredential};
pub use error::LeakDetectionError;
pub use factory::{LeakDetectionCheckFactory, LeakDetectionCheckFactoryImpl};
pub use request::{
    HttpLeakDetectionRequest, HttpLeakDetectionRequestFactory, LeakDetectionRequest,
    LeakDetectionRequestFactory,
};
pub use token::{AccessToken, AccessTokenProvider, TokenError};
