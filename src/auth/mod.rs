//! Request authentication and password handling.
//!
//! Every protected route resolves an [`AuthProvider`] into a [`Principal`]; a provider either
//! yields one or rejects the request. Nothing falls back to an anonymous or default identity
//! unless [`DevAuthProvider`] was selected in the configuration.

mod dev;
mod jwt;
pub mod password;

use axum::http::{HeaderMap, header::AUTHORIZATION};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use self::{dev::DevAuthProvider, jwt::JwtAuthProvider};

/// Authenticated caller on whose behalf a request runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid bearer token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
    #[error("token subject `{subject}` is not a user id")]
    InvalidSubject {
        subject: String,
        #[source]
        source: uuid::Error,
    },
    #[error("failed to sign token")]
    Issue(#[source] jsonwebtoken::errors::Error),
    #[error("password hashing failed")]
    Hashing(#[source] bcrypt::BcryptError),
    #[error("password hashing task did not complete")]
    HashingTask(#[source] tokio::task::JoinError),
}

impl AuthError {
    /// Whether the error means "not authenticated" rather than a server fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken | AuthError::InvalidToken(_) | AuthError::InvalidSubject { .. }
        )
    }
}

/// Source of principals for incoming requests.
pub trait AuthProvider: Send + Sync {
    /// Resolve the bearer token (if any) into a principal.
    fn authenticate(&self, bearer: Option<String>) -> BoxFuture<'static, Result<Principal, AuthError>>;
}

/// Extract the token of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_owned())
}
