//! Boundary interfaces towards the saved-password and compromised-credential
//! stores. Both are external, independently owned data sources; this crate
//! only reads from them.

use async_trait::async_trait;

use crate::forms::{CompromisedCredentials, PasswordForm};

/// Read-only view over the user's saved passwords.
pub trait SavedPasswordsPresenter: Send + Sync {
    fn saved_passwords(&self) -> Vec<PasswordForm>;
}

/// Edit notifications from the saved-password domain. The adapter implements
/// this to re-check a credential the moment its password changes.
pub trait SavedPasswordsObserver: Send + Sync {
    fn on_edited(&self, form: &PasswordForm);
}

/// Asynchronous, read-only access to the persisted compromise records.
#[async_trait]
pub trait CompromisedCredentialsStore: Send + Sync {
    async fn get_all_compromised_credentials(&self) -> Vec<CompromisedCredentials>;
}

/// Change notifications from the compromised-credentials store. The provider
/// implements this to refresh its joined view.
pub trait CompromisedCredentialsStoreObserver: Send + Sync {
    fn on_compromised_credentials_changed(&self);
}
