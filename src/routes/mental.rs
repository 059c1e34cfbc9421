use axum::{
    Extension, Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};
use serde_json::Value;

use crate::{
    auth::Principal,
    dto::mental::{MentalStateInput, MentalStateMessageResponse},
    error::{AppError, ErrorBody},
    routes::object_body,
    services::mental_state_service,
    state::SharedState,
};

const UPDATED: &str = "Mental state updated successfully";

pub fn router() -> Router<SharedState> {
    Router::new().route(
        "/games/{id}/mental",
        post(upsert_mental_state).put(update_mental_state),
    )
}

/// Record the mental state of a game, replacing any previous check-in.
#[utoipa::path(
    post,
    path = "/games/{id}/mental",
    tag = "mental",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Game identifier")),
    request_body = MentalStateInput,
    responses(
        (status = 201, description = "Mental state created", body = MentalStateMessageResponse),
        (status = 200, description = "Existing mental state replaced", body = MentalStateMessageResponse),
        (status = 400, description = "Invalid mental state fields", body = ErrorBody),
        (status = 403, description = "Game belongs to another player", body = ErrorBody),
        (status = 404, description = "Game not found", body = ErrorBody)
    )
)]
pub async fn upsert_mental_state(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<MentalStateMessageResponse>), AppError> {
    let input = object_body(payload)?;
    let outcome = mental_state_service::upsert_mental_state(&state, &principal, &id, &input).await?;

    let (status, message) = if outcome.created {
        (StatusCode::CREATED, "Mental state created successfully")
    } else {
        (StatusCode::OK, UPDATED)
    };
    Ok((
        status,
        Json(MentalStateMessageResponse {
            message: message.into(),
            mental_state: outcome.mental_state,
        }),
    ))
}

/// Change some fields of an existing mental state.
#[utoipa::path(
    put,
    path = "/games/{id}/mental",
    tag = "mental",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Game identifier")),
    request_body = MentalStateInput,
    responses(
        (status = 200, description = "Mental state updated", body = MentalStateMessageResponse),
        (status = 400, description = "Invalid mental state fields", body = ErrorBody),
        (status = 403, description = "Game belongs to another player", body = ErrorBody),
        (status = 404, description = "Game or mental state not found", body = ErrorBody)
    )
)]
pub async fn update_mental_state(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MentalStateMessageResponse>, AppError> {
    let input = object_body(payload)?;
    let mental_state =
        mental_state_service::update_mental_state(&state, &principal, &id, &input).await?;
    Ok(Json(MentalStateMessageResponse {
        message: UPDATED.into(),
        mental_state,
    }))
}
