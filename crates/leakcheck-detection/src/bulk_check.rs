//! Per-batch orchestration of credential leak lookups.
//!
//! A [`BulkLeakCheckImpl`] owns one batch of checks: a single shared
//! access-token fetch, one lookup task per credential and the delegate
//! callbacks reporting outcomes. Dropping the batch aborts everything still
//! outstanding; no delegate callback fires afterwards.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use log::{debug, info, warn};
use tokio::sync::{Semaphore, watch};
use tokio::task::AbortHandle;

use crate::cipher::CredentialCipher;
use crate::credential::{IsLeaked, LeakCheckCredential};
use crate::error::LeakDetectionError;
use crate::request::LeakDetectionRequestFactory;
use crate::token::{AccessToken, AccessTokenProvider, TokenError};

/// A running batch of credential checks.
pub trait BulkLeakCheck: Send {
    /// Enqueues more credentials into the batch. May be called repeatedly;
    /// later calls share the batch's access token.
    fn check_credentials(&mut self, credentials: Vec<LeakCheckCredential>);

    /// Number of lookups not yet completed.
    fn pending_checks_count(&self) -> usize;
}

/// Receives the outcome of checks. Implemented by the owning service.
pub trait BulkLeakCheckDelegate: Send + Sync {
    /// One credential finished; the pending count already reflects it.
    fn on_finished_credential(&self, credential: LeakCheckCredential, is_leaked: IsLeaked);

    /// The batch failed. Reported at most once; the owner is expected to
    /// tear the batch down in response.
    fn on_error(&self, error: LeakDetectionError);
}

/// State shared between the batch owner and its spawned tasks.
struct BatchShared {
    delegate: Arc<dyn BulkLeakCheckDelegate>,
    request_factory: Arc<dyn LeakDetectionRequestFactory>,
    cipher: Arc<dyn CredentialCipher>,
    pending: AtomicUsize,
    // Once set, no further delegate callback may fire. Set on drop and on
    // the first batch-fatal error.
    cancelled: AtomicBool,
    lookup_limiter: Semaphore,
}

impl BatchShared {
    fn finish_credential(&self, credential: LeakCheckCredential, is_leaked: IsLeaked) {
        // Decrement first so the delegate observes the post-completion count.
        self.pending.fetch_sub(1, Ordering::SeqCst);
        if !self.cancelled.load(Ordering::SeqCst) {
            self.delegate.on_finished_credential(credential, is_leaked);
        }
    }

    fn fail_batch(&self, error: LeakDetectionError) {
        // Only the first failure is reported; the owner tears the batch down
        // and every other task winds down silently.
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            warn!("bulk leak check failed: {error}");
            self.delegate.on_error(error);
        }
    }
}

/// Default [`BulkLeakCheck`] implementation backed by Tokio tasks.
pub struct BulkLeakCheckImpl {
    shared: Arc<BatchShared>,
    token_provider: Arc<dyn AccessTokenProvider>,
    token_rx: watch::Receiver<Option<AccessToken>>,
    // Taken by the fetch task on first use; `None` afterwards.
    token_tx: Option<watch::Sender<Option<AccessToken>>>,
    tasks: Vec<AbortHandle>,
}

impl BulkLeakCheckImpl {
    pub fn new(
        delegate: Arc<dyn BulkLeakCheckDelegate>,
        token_provider: Arc<dyn AccessTokenProvider>,
        request_factory: Arc<dyn LeakDetectionRequestFactory>,
        cipher: Arc<dyn CredentialCipher>,
        max_concurrent_lookups: usize,
    ) -> Self {
        let (token_tx, token_rx) = watch::channel(None);
        Self {
            shared: Arc::new(BatchShared {
                delegate,
                request_factory,
                cipher,
                pending: AtomicUsize::new(0),
                cancelled: AtomicBool::new(false),
                lookup_limiter: Semaphore::new(max_concurrent_lookups.max(1)),
            }),
            token_provider,
            token_rx,
            token_tx: Some(token_tx),
            tasks: Vec::new(),
        }
    }

    /// Starts the shared token fetch the first time credentials arrive. The
    /// fetched token is published through a one-shot `watch` value that every
    /// lookup task awaits.
    fn ensure_token_fetch(&mut self) {
        let Some(token_tx) = self.token_tx.take() else {
            return;
        };
        let provider = Arc::clone(&self.token_provider);
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            match provider.fetch_access_token().await {
                Ok(token) => {
                    debug!("access token acquired for bulk leak check");
                    // A send error only means every lookup task is gone already.
                    let _ = token_tx.send(Some(token));
                }
                Err(err) => {
                    let error = match err {
                        TokenError::AuthRejected(_) => LeakDetectionError::TokenRequestFailure,
                        TokenError::Network(reason) => LeakDetectionError::NetworkError(reason),
                    };
                    shared.fail_batch(error);
                    // Dropping the sender wakes the lookup tasks, which then
                    // wind down without reporting anything further.
                }
            }
        });
        self.tasks.push(handle.abort_handle());
    }

    fn spawn_lookup(&mut self, credential: LeakCheckCredential) {
        let shared = Arc::clone(&self.shared);
        let mut token_rx = self.token_rx.clone();
        let handle = tokio::spawn(async move {
            // Await the batch's shared token. A closed channel means the
            // token fetch failed and the batch error was already reported.
            let token = {
                match token_rx.wait_for(Option::is_some).await {
                    Ok(guard) => match guard.as_ref() {
                        Some(token) => token.clone(),
                        None => return,
                    },
                    Err(_) => return,
                }
            };

            // Bound the number of concurrently in-flight lookups.
            let _permit = match shared.lookup_limiter.acquire().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            let payload = match shared
                .cipher
                .build_payload(credential.username(), credential.password())
            {
                Ok(payload) => payload,
                Err(err) => {
                    debug!("payload construction failed for {credential:?}: {err}");
                    shared.fail_batch(LeakDetectionError::HashingFailure);
                    return;
                }
            };

            let request = shared.request_factory.create_request();
            match request.lookup_single_leak(&token, payload).await {
                Ok(is_leaked) => shared.finish_credential(credential, is_leaked),
                Err(error) => shared.fail_batch(error),
            }
        });
        self.tasks.push(handle.abort_handle());
    }
}

impl BulkLeakCheck for BulkLeakCheckImpl {
    fn check_credentials(&mut self, credentials: Vec<LeakCheckCredential>) {
        info!("enqueueing {} credential checks", credentials.len());
        self.shared
            .pending
            .fetch_add(credentials.len(), Ordering::SeqCst);
        self.ensure_token_fetch();
        for credential in credentials {
            self.spawn_lookup(credential);
        }
    }

    fn pending_checks_count(&self) -> usize {
        self.shared.pending.load(Ordering::SeqCst)
    }
}

impl Drop for BulkLeakCheckImpl {
    fn drop(&mut self) {
        // Forbid further delegate callbacks before aborting, so a task racing
        // past an abort point cannot report into a destroyed batch.
        self.shared.cancelled.store(true, Ordering::SeqCst);
        for task in &self.tasks {
            task.abort();
        }
    }
}
