//! Bearer credential verification.

use async_trait::async_trait;

use crate::result::AppResult;

/// Verifies a bearer credential and yields the authenticated username.
#[async_trait]
pub trait TokenVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Return the username the token was issued to, or an authentication
    /// error.
    async fn verify(&self, token: &str) -> AppResult<String>;
}
