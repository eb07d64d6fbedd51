//! Turns a bearer credential into a request context.

use std::sync::Arc;

use tracing::debug;

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_core::traits::TokenVerifier;
use drivehub_database::UserStore;

use crate::context::RequestContext;

/// Resolves bearer tokens to authenticated callers.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    /// Token verifier.
    verifier: Arc<dyn TokenVerifier>,
    /// User store.
    users: Arc<dyn UserStore>,
}

impl IdentityResolver {
    /// Creates a new identity resolver.
    pub fn new(verifier: Arc<dyn TokenVerifier>, users: Arc<dyn UserStore>) -> Self {
        Self { verifier, users }
    }

    /// Verifies `token` and loads the user it names.
    pub async fn resolve(&self, token: &str) -> AppResult<RequestContext> {
        let username = self.verifier.verify(token).await?;
        let user = self
            .users
            .find_by_username(&username)
            .await?
            .ok_or_else(|| AppError::authentication("Could not validate credentials"))?;
        debug!(user_id = %user.id, "Caller resolved");
        Ok(RequestContext::for_user(&user))
    }
}
