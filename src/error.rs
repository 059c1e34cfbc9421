use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::{auth::AuthError, dao::storage::StorageError, dto::validation::FieldError};

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A request field failed validation.
    #[error(transparent)]
    Validation(#[from] FieldError),
    /// Invalid input that is not tied to a single game or mental state field.
    #[error("{0}")]
    InvalidInput(String),
    /// The caller is not authenticated.
    #[error("unauthorized")]
    Unauthorized,
    /// Wrong credentials presented at login.
    #[error("Invalid email or password")]
    InvalidCredentials,
    /// The caller does not own the requested resource.
    #[error("forbidden")]
    Forbidden,
    /// Requested resource was not found.
    #[error("{0}")]
    NotFound(String),
    /// The operation conflicts with existing data.
    #[error("{0}")]
    Conflict(String),
    /// Storage backend failed.
    #[error("storage failure")]
    Storage(#[source] StorageError),
    /// Any other unexpected failure.
    #[error("{0}")]
    Internal(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Storage(err)
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        if err.is_rejection() {
            ServiceError::Unauthorized
        } else {
            ServiceError::Internal(err.to_string())
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("{0}")]
    BadRequest(String),
    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),
    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("{0}")]
    NotFound(String),
    /// Conflict with existing data.
    #[error("{0}")]
    Conflict(String),
    /// Internal server error; the detail is logged, never returned.
    #[error("{0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(field) => AppError::BadRequest(field.message()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::Unauthorized => AppError::Unauthorized("Unauthorized".into()),
            ServiceError::InvalidCredentials => {
                AppError::Unauthorized("Invalid email or password".into())
            }
            ServiceError::Forbidden => AppError::Forbidden("Unauthorized".into()),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Conflict(message) => AppError::Conflict(message),
            ServiceError::Storage(source) => {
                error!(error = %source, detail = ?source, "storage operation failed");
                AppError::Internal(source.to_string())
            }
            ServiceError::Internal(message) => {
                error!(error = %message, "request failed");
                AppError::Internal(message)
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        ServiceError::from(err).into()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection, "rejected request body");
        AppError::BadRequest("Invalid JSON body".into())
    }
}

/// Error payload returned by every failing endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human readable description of the failure.
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            AppError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Conflict(message) => (StatusCode::CONFLICT, message),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_MESSAGE.to_owned(),
            ),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_internal_errors_hide_their_detail() {
        let err: AppError = ServiceError::Internal("secret connection string".into()).into();
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_of(response).await,
            serde_json::json!({"error": "Internal server error"})
        );
    }

    #[tokio::test]
    async fn test_service_errors_map_to_status_codes() {
        let cases = [
            (ServiceError::Unauthorized, StatusCode::UNAUTHORIZED, "Unauthorized"),
            (ServiceError::Forbidden, StatusCode::FORBIDDEN, "Unauthorized"),
            (
                ServiceError::NotFound("Game not found".into()),
                StatusCode::NOT_FOUND,
                "Game not found",
            ),
            (
                ServiceError::Conflict("User with this email already exists".into()),
                StatusCode::CONFLICT,
                "User with this email already exists",
            ),
            (
                ServiceError::InvalidCredentials,
                StatusCode::UNAUTHORIZED,
                "Invalid email or password",
            ),
        ];

        for (err, status, message) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), status);
            assert_eq!(body_of(response).await["error"], message);
        }
    }
}
