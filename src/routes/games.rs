use axum::{
    Extension, Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use serde_json::Value;

use crate::{
    auth::Principal,
    dto::game::{
        GameInput, GameListResponse, GameMessageResponse, GameResponse, MessageResponse,
    },
    error::{AppError, ErrorBody},
    routes::object_body,
    services::game_service,
    state::SharedState,
};

/// Game CRUD for the authenticated player.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route(
            "/games/{id}",
            get(get_game).put(update_game).delete(delete_game),
        )
}

/// List the caller's games, most recent first.
#[utoipa::path(
    get,
    path = "/games",
    tag = "games",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Games of the caller", body = GameListResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody)
    )
)]
pub async fn list_games(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<GameListResponse>, AppError> {
    let games = game_service::list_games(&state, &principal).await?;
    Ok(Json(GameListResponse { games }))
}

/// Log a new game.
#[utoipa::path(
    post,
    path = "/games",
    tag = "games",
    security(("bearer_auth" = [])),
    request_body = GameInput,
    responses(
        (status = 201, description = "Game created", body = GameMessageResponse),
        (status = 400, description = "Invalid game fields", body = ErrorBody),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody)
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<GameMessageResponse>), AppError> {
    let input = object_body(payload)?;
    let game = game_service::create_game(&state, &principal, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(GameMessageResponse {
            message: "Game created successfully".into(),
            game,
        }),
    ))
}

/// Fetch one of the caller's games with its mental state.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "games",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game found", body = GameResponse),
        (status = 403, description = "Game belongs to another player", body = ErrorBody),
        (status = 404, description = "Game not found", body = ErrorBody)
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, AppError> {
    let game = game_service::get_game(&state, &principal, &id).await?;
    Ok(Json(GameResponse { game }))
}

/// Change some fields of a game.
#[utoipa::path(
    put,
    path = "/games/{id}",
    tag = "games",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Game identifier")),
    request_body = GameInput,
    responses(
        (status = 200, description = "Game updated", body = GameMessageResponse),
        (status = 400, description = "Invalid game fields", body = ErrorBody),
        (status = 403, description = "Game belongs to another player", body = ErrorBody),
        (status = 404, description = "Game not found", body = ErrorBody)
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GameMessageResponse>, AppError> {
    let input = object_body(payload)?;
    let game = game_service::update_game(&state, &principal, &id, &input).await?;
    Ok(Json(GameMessageResponse {
        message: "Game updated successfully".into(),
        game,
    }))
}

/// Delete a game together with its mental state.
#[utoipa::path(
    delete,
    path = "/games/{id}",
    tag = "games",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game deleted", body = MessageResponse),
        (status = 403, description = "Game belongs to another player", body = ErrorBody),
        (status = 404, description = "Game not found", body = ErrorBody)
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    game_service::delete_game(&state, &principal, &id).await?;
    Ok(Json(MessageResponse::new("Game deleted successfully")))
}
