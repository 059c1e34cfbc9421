use axum::{Extension, Json, Router, extract::State, routing::get};

use crate::{
    auth::Principal,
    dto::insights::InsightsResponse,
    error::{AppError, ErrorBody},
    services::insights_service,
    state::SharedState,
};

pub fn router() -> Router<SharedState> {
    Router::new().route("/insights", get(dashboard))
}

/// Season averages, confidence and sleep comparisons, and the latest games.
#[utoipa::path(
    get,
    path = "/insights",
    tag = "insights",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard for the caller", body = InsightsResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody)
    )
)]
pub async fn dashboard(
    State(state): State<SharedState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<InsightsResponse>, AppError> {
    Ok(Json(insights_service::dashboard(&state, &principal).await?))
}
