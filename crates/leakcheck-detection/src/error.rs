use thiserror::Error;

/// Batch- and credential-level failures surfaced by the leak detection
/// pipeline. A single error aborts the whole batch; there is no per-credential
/// retry or isolation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeakDetectionError {
    /// No signed-in account is available; a check cannot even be created.
    #[error("no signed-in account available for the leak check")]
    NotSignIn,

    /// The identity provider rejected the access-token request.
    #[error("access token request was rejected")]
    TokenRequestFailure,

    /// Hashing or encrypting the credential payload failed.
    #[error("failed to build the credential lookup payload")]
    HashingFailure,

    /// The leak detection endpoint returned something we cannot interpret.
    #[error("invalid response from the leak detection service: {0}")]
    InvalidServerResponse(String),

    /// Transient connectivity failure during token fetch or lookup.
    #[error("network error during leak lookup: {0}")]
    NetworkError(String),
}

impl From<reqwest::Error> for LeakDetectionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LeakDetectionError::InvalidServerResponse(err.to_string())
        } else {
            // Connect, timeout, request and body errors are all transport-level.
            LeakDetectionError::NetworkError(err.to_string())
        }
    }
}
