//! Game logging: ownership-checked CRUD over a player's games.
//!
//! Every lookup reports a missing game before a foreign one, and ownership is settled before
//! the payload is validated or anything is written.

use std::time::SystemTime;

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    auth::Principal,
    dao::models::{GameEntity, GameRecord},
    dto::{
        game::GameView,
        validation::{FieldBag, ValidationMode, validate_game_fields, validate_new_game},
    },
    error::ServiceError,
    state::SharedState,
};

pub(crate) const GAME_NOT_FOUND: &str = "Game not found";

pub(crate) fn game_not_found() -> ServiceError {
    ServiceError::NotFound(GAME_NOT_FOUND.into())
}

/// Fetch a game with its mental state, enforcing that `principal` owns it.
///
/// Identifiers that are not UUIDs cannot name a game and are reported as not found.
pub(crate) async fn owned_game(
    state: &SharedState,
    principal: &Principal,
    id: &str,
) -> Result<GameRecord, ServiceError> {
    let id = Uuid::parse_str(id).map_err(|_| game_not_found())?;
    let record = state
        .store()
        .find_game(id)
        .await?
        .ok_or_else(game_not_found)?;

    if record.game.user_id != principal.id {
        debug!(game_id = %id, user_id = %principal.id, "rejecting access to foreign game");
        return Err(ServiceError::Forbidden);
    }
    Ok(record)
}

/// All games of the caller, most recent first.
pub async fn list_games(
    state: &SharedState,
    principal: &Principal,
) -> Result<Vec<GameView>, ServiceError> {
    let records = state.store().list_games(principal.id).await?;
    Ok(records.into_iter().map(GameView::from).collect())
}

pub async fn create_game(
    state: &SharedState,
    principal: &Principal,
    input: &FieldBag,
) -> Result<GameView, ServiceError> {
    let fields = validate_new_game(input)?;
    let now = SystemTime::now();
    let game = GameEntity {
        id: Uuid::new_v4(),
        user_id: principal.id,
        date: fields.date,
        opponent: fields.opponent,
        home_away: fields.home_away,
        result: fields.result,
        goals: fields.goals,
        assists: fields.assists,
        shots: fields.shots,
        plus_minus: fields.plus_minus,
        ice_time: fields.ice_time,
        created_at: now,
        updated_at: now,
    };

    state.store().insert_game(game.clone()).await?;
    info!(game_id = %game.id, user_id = %principal.id, "game created");

    Ok(GameRecord {
        game,
        mental_state: None,
    }
    .into())
}

pub async fn get_game(
    state: &SharedState,
    principal: &Principal,
    id: &str,
) -> Result<GameView, ServiceError> {
    owned_game(state, principal, id).await.map(GameView::from)
}

/// Apply the supplied fields to a game; fields left out keep their stored value.
pub async fn update_game(
    state: &SharedState,
    principal: &Principal,
    id: &str,
    input: &FieldBag,
) -> Result<GameView, ServiceError> {
    let record = owned_game(state, principal, id).await?;
    let patch = validate_game_fields(input, ValidationMode::Patch)?;

    let updated = state
        .store()
        .update_game(record.game.id, patch, SystemTime::now())
        .await?
        .ok_or_else(game_not_found)?;
    info!(game_id = %updated.game.id, "game updated");

    Ok(updated.into())
}

/// Delete a game; its mental state goes with it.
pub async fn delete_game(
    state: &SharedState,
    principal: &Principal,
    id: &str,
) -> Result<(), ServiceError> {
    let record = owned_game(state, principal, id).await?;
    if !state.store().delete_game(record.game.id).await? {
        return Err(game_not_found());
    }
    info!(game_id = %record.game.id, "game deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::services::test_support::{bag, principal, test_state};

    fn rangers() -> FieldBag {
        bag(json!({
            "date": "2024-01-01",
            "opponent": "Rangers",
            "homeAway": "home",
            "result": "win",
        }))
    }

    #[tokio::test]
    async fn test_create_game_applies_defaults() {
        let state = test_state();
        let owner = principal();

        let game = create_game(&state, &owner, &rangers()).await.unwrap();

        assert_eq!(game.user_id, owner.id);
        assert_eq!((game.goals, game.assists, game.shots), (0, 0, 0));
        assert_eq!(game.plus_minus, 0);
        assert_eq!(game.ice_time, 0.0);
        assert!(game.mental_state.is_none());
        assert_eq!(game.date, "2024-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn test_points_are_goals_plus_assists() {
        let state = test_state();
        let owner = principal();
        let mut input = rangers();
        input.insert("goals".into(), json!(2));
        input.insert("assists".into(), json!(3));

        let created = create_game(&state, &owner, &input).await.unwrap();
        let fetched = get_game(&state, &owner, &created.id.to_string()).await.unwrap();

        assert_eq!(fetched.points, 5);
    }

    #[tokio::test]
    async fn test_foreign_game_is_forbidden_missing_game_is_not_found() {
        let state = test_state();
        let owner = principal();
        let intruder = principal();
        let game = create_game(&state, &owner, &rangers()).await.unwrap();
        let id = game.id.to_string();

        assert!(matches!(
            get_game(&state, &intruder, &id).await,
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            delete_game(&state, &intruder, &id).await,
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            get_game(&state, &intruder, &Uuid::new_v4().to_string()).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            get_game(&state, &owner, "not-a-uuid").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_ownership_is_checked_before_validation() {
        let state = test_state();
        let owner = principal();
        let game = create_game(&state, &owner, &rangers()).await.unwrap();

        let result = update_game(
            &state,
            &principal(),
            &game.id.to_string(),
            &bag(json!({"goals": -1})),
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[tokio::test]
    async fn test_update_is_idempotent_and_partial() {
        let state = test_state();
        let owner = principal();
        let game = create_game(&state, &owner, &rangers()).await.unwrap();
        let id = game.id.to_string();
        let patch = bag(json!({"goals": 2, "result": "loss"}));

        let first = update_game(&state, &owner, &id, &patch).await.unwrap();
        let second = update_game(&state, &owner, &id, &patch).await.unwrap();

        for updated in [&first, &second] {
            assert_eq!(updated.goals, 2);
            assert_eq!(updated.result, crate::dao::models::GameResult::Loss);
            assert_eq!(updated.opponent, "Rangers");
            assert_eq!(updated.created_at, game.created_at);
        }
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_caller() {
        let state = test_state();
        let owner = principal();
        create_game(&state, &owner, &rangers()).await.unwrap();
        create_game(&state, &principal(), &rangers()).await.unwrap();

        let games = list_games(&state, &owner).await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].user_id, owner.id);
    }

    #[tokio::test]
    async fn test_delete_removes_game() {
        let state = test_state();
        let owner = principal();
        let game = create_game(&state, &owner, &rangers()).await.unwrap();
        let id = game.id.to_string();

        delete_game(&state, &owner, &id).await.unwrap();

        assert!(matches!(
            get_game(&state, &owner, &id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
