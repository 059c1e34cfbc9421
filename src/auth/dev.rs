use futures::future::BoxFuture;
use tracing::warn;

use super::{AuthError, AuthProvider, Principal};

/// Authenticates every request as one fixed principal.
///
/// Only constructed when `auth.mode = "dev"`; intended for local front-end work.
pub struct DevAuthProvider {
    principal: Principal,
}

impl DevAuthProvider {
    pub fn new(principal: Principal) -> Self {
        warn!(
            user_id = %principal.id,
            email = %principal.email,
            "development authentication enabled; every request runs as this user"
        );
        Self { principal }
    }
}

impl AuthProvider for DevAuthProvider {
    fn authenticate(&self, _bearer: Option<String>) -> BoxFuture<'static, Result<Principal, AuthError>> {
        let principal = self.principal.clone();
        Box::pin(async move { Ok(principal) })
    }
}
