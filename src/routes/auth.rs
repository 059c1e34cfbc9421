use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};

use crate::{
    dto::auth::{LoginRequest, SignupRequest, SignupResponse, TokenResponse},
    error::{AppError, ErrorBody},
    services::account_service,
    state::SharedState,
};

/// Public account endpoints; no principal required.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 400, description = "Missing or invalid field", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    )
)]
/// Create a player account.
pub async fn signup(
    State(state): State<SharedState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let Json(request) = payload?;
    let user = account_service::signup(&state, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully".into(),
            user,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = TokenResponse),
        (status = 401, description = "Invalid email or password", body = ErrorBody)
    )
)]
/// Exchange credentials for a bearer token.
pub async fn login(
    State(state): State<SharedState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(request) = payload?;
    Ok(Json(account_service::login(&state, request).await?))
}
