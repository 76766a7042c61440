use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire payload for a single leak lookup: a short prefix of the hashed
/// canonical username (coarse bucketing on the server side) plus the
/// encrypted credential blob the server matches against its corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupSingleLeakPayload {
    pub username_hash_prefix: Vec<u8>,
    pub encrypted_payload: Vec<u8>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("credential payload construction failed: {0}")]
pub struct CipherError(pub String);

/// External crypto collaborator turning a credential into a lookup payload.
///
/// Hashing and encryption schemes live entirely behind this trait; the
/// orchestration layer only maps a failure to
/// [`LeakDetectionError::HashingFailure`](crate::LeakDetectionError).
pub trait CredentialCipher: Send + Sync {
    fn build_payload(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LookupSingleLeakPayload, CipherError>;
}
