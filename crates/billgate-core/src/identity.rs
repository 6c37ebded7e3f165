use async_trait::async_trait;
use thiserror::Error;

/// Caller identity resolved from a bearer credential.
///
/// Carries the raw access token so backend calls run as the caller.
#[derive(Clone)]
pub struct AuthenticatedContext {
    pub access_token: String,
    /// `sub` claim, when the token could be decoded.
    pub subject: Option<String>,
    /// `role` claim, when present.
    pub role: Option<String>,
}

impl std::fmt::Debug for AuthenticatedContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedContext")
            .field("access_token", &"<redacted>")
            .field("subject", &self.subject)
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Turns a bearer credential into an [`AuthenticatedContext`].
#[async_trait]
pub trait IdentityResolver: Send + Sync + 'static {
    async fn resolve(&self, credential: &str) -> Result<AuthenticatedContext, IdentityError>;
}
