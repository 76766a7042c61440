use async_trait::async_trait;
use thiserror::Error;

/// Opaque OAuth2 access token used to authorize lookup requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);

/// Failures of a token fetch, split the way the service state machine needs
/// them: a rejection is an identity problem, anything else is transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("identity provider rejected the token request: {0}")]
    AuthRejected(String),

    #[error("network failure during token request: {0}")]
    Network(String),
}

/// Identity collaborator. One token is fetched per batch and shared across
/// all of its lookups.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Whether a primary account is available at all. Consulted by the check
    /// factory before a batch is created.
    fn is_signed_in(&self) -> bool;

    async fn fetch_access_token(&self) -> Result<AccessToken, TokenError>;
}
