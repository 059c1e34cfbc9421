use axum::{
    Json, Router,
    body::Body,
    extract::{Request, State, rejection::JsonRejection},
    middleware::{self, Next},
    response::Response,
};
use serde_json::Value;
use tracing::debug;

use crate::{
    auth::bearer_token, dto::validation::FieldBag, error::AppError, state::SharedState,
};

pub mod auth;
pub mod docs;
pub mod games;
pub mod health;
pub mod insights;
pub mod mental;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let protected = games::router()
        .merge(mental::router())
        .merge(insights::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_principal,
        ));

    health::router()
        .merge(auth::router())
        .merge(protected)
        .merge(docs::router())
        .with_state(state)
}

/// Resolve the caller through the configured auth provider and expose it as an
/// `Extension<Principal>`; requests without a principal never reach the handler.
async fn require_principal(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = bearer_token(req.headers());
    let principal = state.auth().authenticate(bearer).await.map_err(|err| {
        debug!(error = %err, path = %req.uri().path(), "rejecting unauthenticated request");
        AppError::from(err)
    })?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Unwrap a JSON body that must be an object.
fn object_body(payload: Result<Json<Value>, JsonRejection>) -> Result<FieldBag, AppError> {
    match payload? {
        Json(Value::Object(fields)) => Ok(fields),
        Json(_) => Err(AppError::BadRequest("Invalid JSON body".into())),
    }
}
