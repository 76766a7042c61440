//! Adapter feeding deduplicated saved passwords into the leak check service.

use std::collections::HashMap;
use std::sync::Arc;

use log::info;

use leakcheck_detection::{LeakCheckCredential, canonicalize_username};
use leakcheck_service::{BulkLeakCheckService, State};

use crate::forms::PasswordForm;
use crate::presenter::{SavedPasswordsObserver, SavedPasswordsPresenter};

/// Key under which [`BulkLeakCheckData`] travels in a credential's user-data
/// map.
pub const BULK_LEAK_CHECK_DATA_KEY: &str = "bulk-leak-check-data";

/// Bundles the saved-password forms that collapse into one checked
/// credential: every form here shares the same canonicalized username and
/// password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkLeakCheckData {
    pub forms: Vec<PasswordForm>,
}

/// Exposes the API the settings surface consumes: start/stop a bulk check
/// over all saved passwords and re-check single edited credentials.
///
/// Holds shared handles to the presenter and the service; both outlive any
/// check they participate in.
pub struct BulkLeakCheckServiceAdapter {
    presenter: Arc<dyn SavedPasswordsPresenter>,
    service: BulkLeakCheckService,
}

impl BulkLeakCheckServiceAdapter {
    pub fn new(presenter: Arc<dyn SavedPasswordsPresenter>, service: BulkLeakCheckService) -> Self {
        Self { presenter, service }
    }

    /// Starts a check over all saved passwords. No-op returning `false` when
    /// a check is already running.
    ///
    /// Credentials are deduplicated by their canonicalized (username,
    /// password) pair before submission; the payload cipher canonicalizes
    /// again when hashing, so this pass exists purely to collapse duplicates
    /// and to remember which forms each checked credential stands for.
    pub fn start_bulk_leak_check(&self) -> bool {
        if self.service.state() == State::Running {
            return false;
        }

        // Group forms by canonical pair, preserving first-occurrence order.
        let mut order: Vec<(String, String)> = Vec::new();
        let mut groups: HashMap<(String, String), Vec<PasswordForm>> = HashMap::new();
        for form in self.presenter.saved_passwords() {
            let key = (canonicalize_username(&form.username), form.password.clone());
            if !groups.contains_key(&key) {
                order.push(key.clone());
            }
            groups.entry(key).or_default().push(form);
        }

        let mut credentials = Vec::with_capacity(order.len());
        for key in order {
            let forms = groups.remove(&key).unwrap_or_default();
            let (username, password) = key;
            let mut credential = LeakCheckCredential::new(username, password);
            credential.set_user_data(BULK_LEAK_CHECK_DATA_KEY, BulkLeakCheckData { forms });
            credentials.push(credential);
        }

        info!(
            "starting bulk leak check over {} deduplicated credentials",
            credentials.len()
        );
        self.service.check_username_password_pairs(credentials);
        true
    }

    /// Asks the service to stop an ongoing check.
    pub fn stop_bulk_leak_check(&self) {
        self.service.cancel();
    }

    pub fn state(&self) -> State {
        self.service.state()
    }

    pub fn pending_checks_count(&self) -> usize {
        self.service.pending_checks_count()
    }
}

impl SavedPasswordsObserver for BulkLeakCheckServiceAdapter {
    fn on_edited(&self, form: &PasswordForm) {
        // A single edited form has nothing to dedupe against, so the raw
        // username is submitted as-is.
        let mut credential = LeakCheckCredential::new(form.username.clone(), form.password.clone());
        credential.set_user_data(
            BULK_LEAK_CHECK_DATA_KEY,
            BulkLeakCheckData {
                forms: vec![form.clone()],
            },
        );
        self.service.check_username_password_pairs(vec![credential]);
    }
}
