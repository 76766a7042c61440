//! End-to-end scenarios through the real factory, orchestrator and service,
//! with fake identity and network collaborators.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use leakcheck_client::{
    AccessToken, AccessTokenProvider, BULK_LEAK_CHECK_DATA_KEY, BulkLeakCheckData,
    BulkLeakCheckService, BulkLeakCheckServiceAdapter, CipherError, CredentialCipher, IsLeaked,
    LeakCheckCredential, LeakDetectionCheckFactoryImpl, LeakDetectionError, LeakDetectionRequest,
    LeakDetectionRequestFactory, LookupSingleLeakPayload, Observer, PasswordForm,
    SavedPasswordsPresenter, State, TokenError,
};

async fn run_until_idle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

struct FakeTokenProvider {
    signed_in: bool,
}

#[async_trait]
impl AccessTokenProvider for FakeTokenProvider {
    fn is_signed_in(&self) -> bool {
        self.signed_in
    }

    async fn fetch_access_token(&self) -> Result<AccessToken, TokenError> {
        Ok(AccessToken("access_token".to_string()))
    }
}

struct FakeCipher;

impl CredentialCipher for FakeCipher {
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

/// Every lookup resolves immediately with the scripted verdict.
struct FixedVerdictFactory {
    is_leaked: bool,
    lookups: Arc<Mutex<usize>>,
}

impl LeakDetectionRequestFactory for FixedVerdictFactory {
    fn create_request(&self) -> Box<dyn LeakDetectionRequest> {
        Box::new(FixedVerdictRequest {
            is_leaked: self.is_leaked,
            lookups: Arc::clone(&self.lookups),
        })
    }
}

struct FixedVerdictRequest {
    is_leaked: bool,
    lookups: Arc<Mutex<usize>>,
}

#[async_trait]
impl LeakDetectionRequest for FixedVerdictRequest {
    async fn lookup_single_leak(
        &self,
        _access_token: &AccessToken,
        _payload: LookupSingleLeakPayload,
    ) -> Result<IsLeaked, LeakDetectionError> {
        *self.lookups.lock().unwrap() += 1;
        Ok(IsLeaked(self.is_leaked))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    StateChanged(State, usize),
    LeakFound { username: String, form_count: usize },
}

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl Observer for RecordingObserver {
    fn on_state_changed(&self, state: State, pending_count: usize) {
        self.events
            .lock()
            .unwrap()
            .push(Event::StateChanged(state, pending_count));
    }

    fn on_leak_found(&self, credential: &LeakCheckCredential) {
        let form_count = credential
            .user_data::<BulkLeakCheckData>(BULK_LEAK_CHECK_DATA_KEY)
            .map(|data| data.forms.len())
            .unwrap_or(0);
        self.events.lock().unwrap().push(Event::LeakFound {
            username: credential.username().to_string(),
            form_count,
        });
    }
}

fn make_service(signed_in: bool, is_leaked: bool) -> (BulkLeakCheckService, Arc<Mutex<usize>>) {
    let lookups = Arc::new(Mutex::new(0));
    let factory = Arc::new(LeakDetectionCheckFactoryImpl::new(
        Arc::new(FakeTokenProvider { signed_in }),
        Arc::new(FixedVerdictFactory {
            is_leaked,
            lookups: Arc::clone(&lookups),
        }),
        Arc::new(FakeCipher),
        10,
    ));
    (BulkLeakCheckService::new(factory), lookups)
}

#[tokio::test]
async fn leaked_credential_flows_through_the_whole_pipeline() {
    let (service, _lookups) = make_service(true, true);
    let observer = Arc::new(RecordingObserver::default());
    service.add_observer(observer.clone());

    service.check_username_password_pairs(vec![LeakCheckCredential::new("user", "password123")]);
    run_until_idle().await;

    assert_eq!(service.state(), State::Idle);
    assert_eq!(
        observer.events(),
        vec![
            Event::StateChanged(State::Running, 1),
            Event::LeakFound {
                username: "user".to_string(),
                form_count: 0,
            },
            Event::StateChanged(State::Idle, 0),
        ]
    );
}

#[tokio::test]
async fn signed_out_user_cannot_start_a_check() {
    let (service, lookups) = make_service(false, true);
    let observer = Arc::new(RecordingObserver::default());
    service.add_observer(observer.clone());

    service.check_username_password_pairs(vec![LeakCheckCredential::new("user", "password123")]);
    run_until_idle().await;

    assert_eq!(service.state(), State::SignedOut);
    assert_eq!(
        observer.events(),
        vec![Event::StateChanged(State::SignedOut, 0)]
    );
    assert_eq!(*lookups.lock().unwrap(), 0);
}

struct FixedPresenter {
    forms: Vec<PasswordForm>,
}

impl SavedPasswordsPresenter for FixedPresenter {
    fn saved_passwords(&self) -> Vec<PasswordForm> {
        self.forms.clone()
    }
}

#[tokio::test]
async fn adapter_driven_check_dedupes_and_reports_all_forms() {
    let (service, lookups) = make_service(true, true);
    let observer = Arc::new(RecordingObserver::default());
    service.add_observer(observer.clone());

    let presenter = Arc::new(FixedPresenter {
        forms: vec![
            PasswordForm {
                signon_realm: "https://example.com".to_string(),
                username: "alice".to_string(),
                password: "f00b4r".to_string(),
            },
            PasswordForm {
                signon_realm: "https://example.com".to_string(),
                username: "ALICE".to_string(),
                password: "f00b4r".to_string(),
            },
            PasswordForm {
                signon_realm: "https://example.com".to_string(),
                username: "Alice@example.com".to_string(),
                password: "f00b4r".to_string(),
            },
        ],
    });
    let adapter = BulkLeakCheckServiceAdapter::new(presenter, service.clone());

    assert!(adapter.start_bulk_leak_check());
    run_until_idle().await;

    // Three saved forms collapse into one lookup whose leak report still
    // carries all of them.
    assert_eq!(*lookups.lock().unwrap(), 1);
    assert_eq!(
        observer.events(),
        vec![
            Event::StateChanged(State::Running, 1),
            Event::LeakFound {
                username: "alice".to_string(),
                form_count: 3,
            },
            Event::StateChanged(State::Idle, 0),
        ]
    );
}
