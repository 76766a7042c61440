//! Factory for batch orchestrators, injectable so the service can be tested
//! without identity or network collaborators.

use std::sync::Arc;

use log::info;

use crate::bulk_check::{BulkLeakCheck, BulkLeakCheckDelegate, BulkLeakCheckImpl};
use crate::cipher::CredentialCipher;
use crate::error::LeakDetectionError;
use crate::request::LeakDetectionRequestFactory;
use crate::token::AccessTokenProvider;

pub trait LeakDetectionCheckFactory: Send + Sync {
    /// Tries to create a batch orchestrator reporting into `delegate`.
    ///
    /// Returns `None` when no check can be created. A refusal with a cause
    /// (e.g. no signed-in account) is reported through the delegate before
    /// returning, so the caller's state machine ends up in the right place
    /// either way.
    fn try_create_bulk_leak_check(
        &self,
        delegate: Arc<dyn BulkLeakCheckDelegate>,
    ) -> Option<Box<dyn BulkLeakCheck>>;
}

pub struct LeakDetectionCheckFactoryImpl {
    token_provider: Arc<dyn AccessTokenProvider>,
    request_factory: Arc<dyn LeakDetectionRequestFactory>,
    cipher: Arc<dyn CredentialCipher>,
    max_concurrent_lookups: usize,
}

impl LeakDetectionCheckFactoryImpl {
    pub fn new(
        token_provider: Arc<dyn AccessTokenProvider>,
        request_factory: Arc<dyn LeakDetectionRequestFactory>,
        cipher: Arc<dyn CredentialCipher>,
        max_concurrent_lookups: usize,
    ) -> Self {
        Self {
            token_provider,
            request_factory,
            cipher,
            max_concurrent_lookups,
        }
    }
}

impl LeakDetectionCheckFactory for LeakDetectionCheckFactoryImpl {
    fn try_create_bulk_leak_check(
        &self,
        delegate: Arc<dyn BulkLeakCheckDelegate>,
    ) -> Option<Box<dyn BulkLeakCheck>> {
        if !self.token_provider.is_signed_in() {
            info!("refusing to start a leak check: no signed-in account");
            delegate.on_error(LeakDetectionError::NotSignIn);
            return None;
        }
        Some(Box::new(BulkLeakCheckImpl::new(
            delegate,
            Arc::clone(&self.token_provider),
            Arc::clone(&self.request_factory),
            Arc::clone(&self.cipher),
            self.max_concurrent_lookups,
        )))
    }
}
