/// Account creation and login.
pub mod account_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Ownership-checked game CRUD.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Dashboard aggregates.
pub mod insights_service;
/// Mental state check-ins attached to games.
pub mod mental_state_service;
