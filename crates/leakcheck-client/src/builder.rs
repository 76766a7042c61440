//! Assembles the production leak-check stack from configuration.

use std::sync::Arc;

use log::info;

use leakcheck_core::Config;
use leakcheck_detection::{
    AccessTokenProvider, CredentialCipher, HttpLeakDetectionRequestFactory,
    LeakDetectionCheckFactoryImpl, LeakDetectionError,
};
use leakcheck_service::BulkLeakCheckService;

/// Builds a ready-to-use [`BulkLeakCheckService`] speaking HTTP to the
/// configured endpoint. Identity and payload crypto stay with the caller.
pub fn build_service(
    config: &Config,
    token_provider: Arc<dyn AccessTokenProvider>,
    cipher: Arc<dyn CredentialCipher>,
) -> Result<BulkLeakCheckService, LeakDetectionError> {
    info!(
        "building bulk leak check service against {}",
        config.detection.endpoint_url
    );
    let request_factory = Arc::new(HttpLeakDetectionRequestFactory::new(&config.detection)?);
    let check_factory = Arc::new(LeakDetectionCheckFactoryImpl::new(
        token_provider,
        request_factory,
        cipher,
        config.detection.max_concurrent_lookups,
    ));
    Ok(BulkLeakCheckService::new(check_factory))
}
