//! A basic example of running a bulk leak check with stub collaborators.
//!
//! A real embedder supplies an identity provider backed by its OAuth stack
//! and a cipher implementing the hash-prefix protocol; the stubs here only
//! exist so the example runs offline and shows the observable surface.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use leakcheck_client::{
    AccessToken, AccessTokenProvider, BulkLeakCheckService, CipherError, CredentialCipher,
    IsLeaked, LeakCheckCredential, LeakDetectionCheckFactoryImpl, LeakDetectionError,
    LeakDetectionRequest, LeakDetectionRequestFactory, LookupSingleLeakPayload, Observer, State,
    TokenError,
};

struct StubTokenProvider;

#[async_trait]
impl AccessTokenProvider for StubTokenProvider {
    fn is_signed_in(&self) -> bool {
        true
    }

    async fn fetch_access_token(&self) -> Result<AccessToken, TokenError> {
        Ok(AccessToken("stub-token".to_string()))
    }
}

struct StubCipher;

impl CredentialCipher for StubCipher {
    fn build_payload(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LookupSingleLeakPayload, CipherError> {
        Ok(LookupSingleLeakPayload {
            username_hash_prefix: username.bytes().take(3).collect(),
            encrypted_payload: password.as_bytes().to_vec(),
        })
    }
}

struct StubRequestFactory;

impl LeakDetectionRequestFactory for StubRequestFactory {
    fn create_request(&self) -> Box<dyn LeakDetectionRequest> {
        Box::new(StubRequest)
    }
}

struct StubRequest;

#[async_trait]
impl LeakDetectionRequest for StubRequest {
    async fn lookup_single_leak(
        &self,
        _access_token: &AccessToken,
        payload: LookupSingleLeakPayload,
    ) -> Result<IsLeaked, LeakDetectionError> {
        // Pretend short passwords are the leaked ones.
        Ok(IsLeaked(payload.encrypted_payload.len() < 8))
    }
}

struct PrintingObserver;

impl Observer for PrintingObserver {
    fn on_state_changed(&self, state: State, pending_count: usize) {
        println!("state: {state:?} ({pending_count} pending)");
    }

    fn on_leak_found(&self, credential: &LeakCheckCredential) {
        println!("leak found for username {:?}", credential.username());
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let factory = Arc::new(LeakDetectionCheckFactoryImpl::new(
        Arc::new(StubTokenProvider),
        Arc::new(StubRequestFactory),
        Arc::new(StubCipher),
        4,
    ));
    let service = BulkLeakCheckService::new(factory);
    service.add_observer(Arc::new(PrintingObserver));

    service.check_username_password_pairs(vec![
        LeakCheckCredential::new("alice", "hunter2"),
        LeakCheckCredential::new("bob", "correct horse battery staple"),
    ]);

    // Give the lookups a moment to resolve.
    tokio::time::sleep(Duration::from_millis(100)).await;
    println!("final state: {:?}", service.state());
}
