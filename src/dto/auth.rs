use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{Position, UserEntity},
    dto::format_system_time,
};

/// Account creation payload. Every field is required; presence is checked by the service so a
/// missing field yields a domain error instead of a deserialization failure.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct SignupRequest {
    pub email: Option<String>,
    #[schema(min_length = 8)]
    pub password: Option<String>,
    pub name: Option<String>,
    pub team: Option<String>,
    /// One of `Center`, `Left Wing`, `Right Wing`, `Defenseman`, `Goalie`.
    pub position: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public view of an account; never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub team: String,
    pub position: Position,
    pub created_at: String,
}

impl From<UserEntity> for UserView {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            team: user.team,
            position: user.position,
            created_at: format_system_time(user.created_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignupResponse {
    pub message: String,
    pub user: UserView,
}

/// Bearer token issued at login.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    pub user: UserView,
}
