//! Joined, displayable view over the persisted compromise records.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use tokio::task::AbortHandle;

use crate::forms::{CompromisedCredentials, CredentialWithPassword, PasswordForm};
use crate::presenter::{
    CompromisedCredentialsStore, CompromisedCredentialsStoreObserver, SavedPasswordsPresenter,
};

/// Notified with the freshly joined list after every refresh, whether or not
/// its content changed.
pub trait CompromisedCredentialsObserver: Send + Sync {
    fn on_compromised_credentials_changed(&self, credentials: &[CredentialWithPassword]);
}

struct ProviderInner {
    credentials: Vec<CredentialWithPassword>,
    observers: Vec<Arc<dyn CompromisedCredentialsObserver>>,
    // Bumped on every refresh; a fetch whose generation no longer matches was
    // superseded and must not surface its result.
    fetch_generation: u64,
    fetch_task: Option<AbortHandle>,
}

/// Joins persisted compromise records against currently saved passwords and
/// keeps the result current across change notifications from the store.
pub struct CompromisedCredentialsProvider {
    store: Arc<dyn CompromisedCredentialsStore>,
    presenter: Arc<dyn SavedPasswordsPresenter>,
    inner: Arc<Mutex<ProviderInner>>,
}

impl CompromisedCredentialsProvider {
    pub fn new(
        store: Arc<dyn CompromisedCredentialsStore>,
        presenter: Arc<dyn SavedPasswordsPresenter>,
    ) -> Self {
        Self {
            store,
            presenter,
            inner: Arc::new(Mutex::new(ProviderInner {
                credentials: Vec::new(),
                observers: Vec::new(),
                fetch_generation: 0,
                fetch_task: None,
            })),
        }
    }

    /// Kicks off the initial fetch.
    pub fn init(&self) {
        self.refresh();
    }

    /// The most recently joined view.
    pub fn compromised_credentials(&self) -> Vec<CredentialWithPassword> {
        lock(&self.inner).credentials.clone()
    }

    pub fn add_observer(&self, observer: Arc<dyn CompromisedCredentialsObserver>) {
        lock(&self.inner).observers.push(observer);
    }

    pub fn remove_observer(&self, observer: &Arc<dyn CompromisedCredentialsObserver>) {
        lock(&self.inner)
            .observers
            .retain(|registered| !Arc::ptr_eq(registered, observer));
    }

    /// Single-flight refresh: supersedes any fetch still outstanding, reads
    /// the store, joins against the saved passwords and notifies observers.
    fn refresh(&self) {
        let generation = {
            let mut inner = lock(&self.inner);
            inner.fetch_generation += 1;
            if let Some(task) = inner.fetch_task.take() {
                task.abort();
            }
            inner.fetch_generation
        };

        let store = Arc::clone(&self.store);
        let presenter = Arc::clone(&self.presenter);
        let inner_handle = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let records = store.get_all_compromised_credentials().await;
            let joined = join_with_saved_passwords(records, &presenter.saved_passwords());
            let observers = {
                let mut inner = lock(&inner_handle);
                if inner.fetch_generation != generation {
                    // A newer refresh raced past this one; its result wins.
                    debug!("discarding superseded compromised-credentials fetch");
                    return;
                }
                inner.credentials = joined.clone();
                inner.fetch_task = None;
                inner.observers.clone()
            };
            for observer in observers {
                observer.on_compromised_credentials_changed(&joined);
            }
        });
        lock(&self.inner).fetch_task = Some(task.abort_handle());
    }
}

impl CompromisedCredentialsStoreObserver for CompromisedCredentialsProvider {
    fn on_compromised_credentials_changed(&self) {
        self.refresh();
    }
}

fn lock(inner: &Arc<Mutex<ProviderInner>>) -> MutexGuard<'_, ProviderInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Joins compromise records with saved passwords: for each record, every
/// distinct password saved under its (signon_realm, username) yields one
/// output row. Records without a matching saved password are dropped.
fn join_with_saved_passwords(
    records: Vec<CompromisedCredentials>,
    saved_passwords: &[PasswordForm],
) -> Vec<CredentialWithPassword> {
    // A single (realm, username) pair may have several saved entries, so the
    // lookup side is a multimap.
    let mut by_login: HashMap<(&str, &str), Vec<&str>> = HashMap::new();
    for form in saved_passwords {
        by_login
            .entry((form.signon_realm.as_str(), form.username.as_str()))
            .or_default()
            .push(form.password.as_str());
    }

    let mut joined = Vec::with_capacity(records.len());
    for record in records {
        let Some(passwords) = by_login.get(&(record.signon_realm.as_str(), record.username.as_str()))
        else {
            continue;
        };
        let mut seen = HashSet::new();
        for &password in passwords {
            if seen.insert(password) {
                joined.push(CredentialWithPassword {
                    credential: record.clone(),
                    password: password.to_string(),
                });
            }
        }
    }
    joined
}
