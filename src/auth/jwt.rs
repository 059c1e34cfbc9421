use futures::future::BoxFuture;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::{AuthError, AuthProvider, Principal};
use crate::dao::models::UserEntity;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id.
    sub: String,
    email: String,
    name: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct JwtAuthProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtAuthProvider {
    pub fn new(secret: &str, ttl_hours: u32) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl: Duration::hours(i64::from(ttl_hours)),
        }
    }

    /// Sign a token for `user`, valid for the configured lifetime.
    pub fn issue(&self, user: &UserEntity) -> Result<String, AuthError> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(AuthError::Issue)
    }

    /// Check signature and expiry, returning the principal encoded in the token.
    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(AuthError::InvalidToken)?
            .claims;

        let id = Uuid::parse_str(&claims.sub).map_err(|source| AuthError::InvalidSubject {
            subject: claims.sub.clone(),
            source,
        })?;

        Ok(Principal {
            id,
            email: claims.email,
            name: claims.name,
        })
    }
}

impl AuthProvider for JwtAuthProvider {
    fn authenticate(&self, bearer: Option<String>) -> BoxFuture<'static, Result<Principal, AuthError>> {
        let result = match bearer {
            Some(token) => self.verify(&token),
            None => Err(AuthError::MissingToken),
        };
        Box::pin(async move { result })
    }
}
