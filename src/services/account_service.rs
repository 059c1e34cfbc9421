//! Account creation and login.

use std::time::SystemTime;

use tracing::{debug, info};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::{
    auth::password::{hash_password, verify_password},
    dao::{
        models::{Position, UserEntity},
        storage::StorageError,
    },
    dto::auth::{LoginRequest, SignupRequest, TokenResponse, UserView},
    error::ServiceError,
    state::SharedState,
};

pub const MIN_PASSWORD_LENGTH: usize = 8;
const EMAIL_TAKEN: &str = "User with this email already exists";

/// Emails are compared case-insensitively and without surrounding whitespace.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn invalid(message: &str) -> ServiceError {
    ServiceError::InvalidInput(message.to_owned())
}

/// Register a new player account.
pub async fn signup(state: &SharedState, request: SignupRequest) -> Result<UserView, ServiceError> {
    let (Some(email), Some(password), Some(name), Some(team), Some(position)) = (
        required(request.email),
        required(request.password),
        required(request.name),
        required(request.team),
        required(request.position),
    ) else {
        return Err(invalid("All fields are required"));
    };

    let email = normalize_email(&email);
    if !email.validate_email() {
        return Err(invalid("Invalid email format"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(invalid("Password must be at least 8 characters long"));
    }
    let position = Position::parse(position.trim()).ok_or_else(|| invalid("Invalid position"))?;

    let store = state.store();
    if store.find_user_by_email(email.clone()).await?.is_some() {
        return Err(ServiceError::Conflict(EMAIL_TAKEN.into()));
    }

    let user = UserEntity {
        id: Uuid::new_v4(),
        email,
        password_hash: hash_password(password).await?,
        name: name.trim().to_owned(),
        team: team.trim().to_owned(),
        position,
        created_at: SystemTime::now(),
    };

    match store.insert_user(user.clone()).await {
        Ok(()) => {}
        Err(StorageError::DuplicateKey { .. }) => {
            return Err(ServiceError::Conflict(EMAIL_TAKEN.into()));
        }
        Err(err) => return Err(err.into()),
    }
    info!(user_id = %user.id, "user created");

    Ok(user.into())
}

/// Check credentials and issue a bearer token.
///
/// Unknown emails and wrong passwords are indistinguishable to the caller.
pub async fn login(state: &SharedState, request: LoginRequest) -> Result<TokenResponse, ServiceError> {
    let (Some(email), Some(password)) = (required(request.email), request.password) else {
        return Err(ServiceError::InvalidCredentials);
    };

    let Some(user) = state
        .store()
        .find_user_by_email(normalize_email(&email))
        .await?
    else {
        debug!("login attempt for unknown email");
        return Err(ServiceError::InvalidCredentials);
    };

    if !verify_password(password, user.password_hash.clone()).await? {
        debug!(user_id = %user.id, "login attempt with wrong password");
        return Err(ServiceError::InvalidCredentials);
    }

    let token = state.tokens().issue(&user)?;
    info!(user_id = %user.id, "user logged in");

    Ok(TokenResponse {
        token,
        user: user.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::test_state;

    fn request() -> SignupRequest {
        SignupRequest {
            email: Some("  Wayne@Example.com ".into()),
            password: Some("greatone99".into()),
            name: Some("Wayne".into()),
            team: Some("Oilers".into()),
            position: Some("Center".into()),
        }
    }

    async fn signup_error(request: SignupRequest) -> String {
        signup(&test_state(), request).await.unwrap_err().to_string()
    }

    #[tokio::test]
    async fn test_signup_normalizes_email_and_hides_hash() {
        let state = test_state();
        let user = signup(&state, request()).await.unwrap();

        assert_eq!(user.email, "wayne@example.com");
        assert_eq!(user.position, Position::Center);

        let stored = state
            .store()
            .find_user_by_email("wayne@example.com".into())
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, "greatone99");
    }

    #[tokio::test]
    async fn test_signup_checks_fields_in_order() {
        assert_eq!(
            signup_error(SignupRequest {
                team: Some("  ".into()),
                ..request()
            })
            .await,
            "All fields are required"
        );
        assert_eq!(
            signup_error(SignupRequest {
                email: Some("not-an-email".into()),
                password: Some("short".into()),
                ..request()
            })
            .await,
            "Invalid email format"
        );
        assert_eq!(
            signup_error(SignupRequest {
                password: Some("short".into()),
                ..request()
            })
            .await,
            "Password must be at least 8 characters long"
        );
        assert_eq!(
            signup_error(SignupRequest {
                position: Some("Enforcer".into()),
                ..request()
            })
            .await,
            "Invalid position"
        );
    }

    #[tokio::test]
    async fn test_duplicate_signup_conflicts() {
        let state = test_state();
        signup(&state, request()).await.unwrap();

        let err = signup(
            &state,
            SignupRequest {
                email: Some("wayne@example.com".into()),
                ..request()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(message) if message == EMAIL_TAKEN));
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let state = test_state();
        let user = signup(&state, request()).await.unwrap();

        let response = login(
            &state,
            LoginRequest {
                email: Some("WAYNE@example.com".into()),
                password: Some("greatone99".into()),
            },
        )
        .await
        .unwrap();

        let principal = state.tokens().verify(&response.token).unwrap();
        assert_eq!(principal.id, user.id);
        assert_eq!(response.user.id, user.id);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let state = test_state();
        signup(&state, request()).await.unwrap();

        for (email, password) in [
            ("wayne@example.com", Some("wrong-password")),
            ("nobody@example.com", Some("greatone99")),
            ("wayne@example.com", None),
        ] {
            let err = login(
                &state,
                LoginRequest {
                    email: Some(email.into()),
                    password: password.map(Into::into),
                },
            )
            .await
            .unwrap_err();
            assert!(matches!(err, ServiceError::InvalidCredentials));
        }
    }
}
