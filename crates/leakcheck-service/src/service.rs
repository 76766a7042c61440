//! The service owning the current batch and fanning results out to observers.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use log::{debug, info, warn};

use leakcheck_detection::{
    BulkLeakCheck, BulkLeakCheckDelegate, IsLeaked, LeakCheckCredential, LeakDetectionCheckFactory,
    LeakDetectionError,
};

/// Overall state of the bulk leak check service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No batch is running.
    Idle,
    /// A batch is in flight. Exactly one orchestrator exists in this state.
    Running,
    /// The check could not run because no account is signed in, or the
    /// identity provider rejected us.
    SignedOut,
    /// The check aborted on a network, hashing or server failure.
    ServiceError,
}

/// Notification surface consumed by the settings layer.
///
/// `on_leak_found` for a credential is always delivered strictly before the
/// `on_state_changed` reflecting that credential's completion; once `Idle`
/// was observed no further leaks will be reported for the batch.
pub trait Observer: Send + Sync {
    fn on_state_changed(&self, state: State, pending_count: usize);
    fn on_leak_found(&self, credential: &LeakCheckCredential);
}

struct ServiceInner {
    state: State,
    bulk_leak_check: Option<Box<dyn BulkLeakCheck>>,
    observers: Vec<Arc<dyn Observer>>,
}

impl ServiceInner {
    fn pending_checks_count(&self) -> usize {
        self.bulk_leak_check
            .as_ref()
            .map(|check| check.pending_checks_count())
            .unwrap_or(0)
    }
}

/// Public, observable facade around zero-or-one active batch. Cheap to clone;
/// clones share the same underlying service.
#[derive(Clone)]
pub struct BulkLeakCheckService {
    inner: Arc<Mutex<ServiceInner>>,
    factory: Arc<dyn LeakDetectionCheckFactory>,
}

impl BulkLeakCheckService {
    pub fn new(factory: Arc<dyn LeakDetectionCheckFactory>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ServiceInner {
                state: State::Idle,
                bulk_leak_check: None,
                observers: Vec::new(),
            })),
            factory,
        }
    }

    /// Starts checking `credentials`, or appends them to the batch already
    /// running. At most one orchestrator ever exists.
    pub fn check_username_password_pairs(&self, credentials: Vec<LeakCheckCredential>) {
        {
            let mut inner = lock(&self.inner);
            if let Some(check) = inner.bulk_leak_check.as_mut() {
                // The check is already running; append and let observers see
                // the grown pending count.
                check.check_credentials(credentials);
                drop(inner);
                self.notify_state_changed();
                return;
            }
        }

        let delegate: Arc<dyn BulkLeakCheckDelegate> = Arc::new(ServiceDelegate {
            inner: Arc::downgrade(&self.inner),
        });
        // A refusal with a cause (e.g. not signed in) arrives through the
        // delegate and has already moved us into the right error state.
        let Some(mut check) = self.factory.try_create_bulk_leak_check(delegate) else {
            return;
        };

        {
            let mut inner = lock(&self.inner);
            inner.state = State::Running;
            check.check_credentials(credentials);
            inner.bulk_leak_check = Some(check);
        }
        // Notify after submission so the count reflects the new batch.
        self.notify_state_changed();
    }

    /// Abandons the running batch, if any. Safe no-op while idle.
    pub fn cancel(&self) {
        {
            let mut inner = lock(&self.inner);
            if inner.bulk_leak_check.is_none() {
                return;
            }
            info!("cancelling bulk leak check");
            inner.state = State::Idle;
            inner.bulk_leak_check = None;
        }
        self.notify_state_changed();
    }

    pub fn state(&self) -> State {
        lock(&self.inner).state
    }

    pub fn pending_checks_count(&self) -> usize {
        lock(&self.inner).pending_checks_count()
    }

    pub fn add_observer(&self, observer: Arc<dyn Observer>) {
        lock(&self.inner).observers.push(observer);
    }

    pub fn remove_observer(&self, observer: &Arc<dyn Observer>) {
        lock(&self.inner)
            .observers
            .retain(|registered| !Arc::ptr_eq(registered, observer));
    }

    /// Drops observers and any running batch. Used on teardown.
    pub fn shutdown(&self) {
        let mut inner = lock(&self.inner);
        inner.observers.clear();
        inner.bulk_leak_check = None;
    }

    fn notify_state_changed(&self) {
        let (state, pending_count, observers) = {
            let inner = lock(&self.inner);
            (
                inner.state,
                inner.pending_checks_count(),
                inner.observers.clone(),
            )
        };
        debug!("service state -> {state:?} ({pending_count} pending)");
        for observer in observers {
            observer.on_state_changed(state, pending_count);
        }
    }
}

// Lock helper tolerating poisoning: a panicking observer must not wedge the
// service for every other caller.
fn lock(inner: &Arc<Mutex<ServiceInner>>) -> MutexGuard<'_, ServiceInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The service's ear on the orchestrator. Holds a weak back-reference so the
/// orchestrator (owned by the service) never keeps the service alive.
struct ServiceDelegate {
    inner: Weak<Mutex<ServiceInner>>,
}

impl BulkLeakCheckDelegate for ServiceDelegate {
    fn on_finished_credential(&self, credential: LeakCheckCredential, is_leaked: IsLeaked) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        // (1) Settle the state, (2) report the leak, (3) report the new
        // state. Clients may assume that once Idle is observed there are no
        // further on_leak_found calls.
        let (state, pending_count, observers) = {
            let mut guard = inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let pending_count = guard.pending_checks_count();
            if pending_count == 0 {
                guard.state = State::Idle;
                guard.bulk_leak_check = None;
            }
            (guard.state, pending_count, guard.observers.clone())
        };

        if is_leaked.0 {
            info!("leak found for credential {credential:?}");
            for observer in &observers {
                observer.on_leak_found(&credential);
            }
        }
        for observer in &observers {
            observer.on_state_changed(state, pending_count);
        }
    }

    fn on_error(&self, error: LeakDetectionError) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let state = match error {
            LeakDetectionError::NotSignIn | LeakDetectionError::TokenRequestFailure => {
                State::SignedOut
            }
            LeakDetectionError::HashingFailure
            | LeakDetectionError::InvalidServerResponse(_)
            | LeakDetectionError::NetworkError(_) => State::ServiceError,
        };
        warn!("bulk leak check aborted: {error}");

        let observers = {
            let mut guard = inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.state = state;
            // The batch is over; dropping the orchestrator abandons whatever
            // was still pending.
            guard.bulk_leak_check = None;
            guard.observers.clone()
        };
        for observer in observers {
            observer.on_state_changed(state, 0);
        }
    }
}
