use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the hockey tracker API.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::auth::signup,
        crate::routes::auth::login,
        crate::routes::games::list_games,
        crate::routes::games::create_game,
        crate::routes::games::get_game,
        crate::routes::games::update_game,
        crate::routes::games::delete_game,
        crate::routes::mental::upsert_mental_state,
        crate::routes::mental::update_mental_state,
        crate::routes::insights::dashboard,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::auth::SignupRequest,
            crate::dto::auth::LoginRequest,
            crate::dto::auth::UserView,
            crate::dto::auth::SignupResponse,
            crate::dto::auth::TokenResponse,
            crate::dto::game::GameInput,
            crate::dto::game::GameView,
            crate::dto::game::GameListResponse,
            crate::dto::game::GameResponse,
            crate::dto::game::GameMessageResponse,
            crate::dto::game::MessageResponse,
            crate::dto::mental::MentalStateInput,
            crate::dto::mental::MentalStateView,
            crate::dto::mental::MentalStateMessageResponse,
            crate::dto::insights::InsightsResponse,
            crate::dto::insights::Insight,
            crate::dto::insights::RecentGame,
            crate::dao::models::HomeAway,
            crate::dao::models::GameResult,
            crate::dao::models::Position,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Account creation and login"),
        (name = "games", description = "Game statistics of the authenticated player"),
        (name = "mental", description = "Post-game mental state check-ins"),
        (name = "insights", description = "Dashboard aggregates"),
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/healthcheck",
            "/auth/signup",
            "/auth/login",
            "/games",
            "/games/{id}",
            "/games/{id}/mental",
            "/insights",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|components| components.security_schemes.contains_key("bearer_auth"))
        );
    }
}
