//! Post-game mental check-ins. A game has at most one; it is created or replaced through
//! [`upsert_mental_state`] and partially edited through [`update_mental_state`].

use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    auth::Principal,
    dao::models::MentalStateEntity,
    dto::{
        mental::MentalStateView,
        validation::{
            FieldBag, ValidationMode, validate_mental_state_fields, validate_new_mental_state,
        },
    },
    error::ServiceError,
    services::game_service::{game_not_found, owned_game},
    state::SharedState,
};

const MENTAL_STATE_NOT_FOUND: &str = "Mental state not found for this game";

/// Result of an upsert; `created` tells whether the game had no check-in before.
#[derive(Debug)]
pub struct UpsertOutcome {
    pub mental_state: MentalStateView,
    pub created: bool,
}

/// Create the game's mental state, or replace every field of the existing one.
///
/// A replacement keeps the original id and creation time.
pub async fn upsert_mental_state(
    state: &SharedState,
    principal: &Principal,
    game_id: &str,
    input: &FieldBag,
) -> Result<UpsertOutcome, ServiceError> {
    let record = owned_game(state, principal, game_id).await?;
    let fields = validate_new_mental_state(input)?;

    let now = SystemTime::now();
    let created = record.mental_state.is_none();
    let (id, created_at) = record
        .mental_state
        .map(|existing| (existing.id, existing.created_at))
        .unwrap_or_else(|| (Uuid::new_v4(), now));

    let entity = MentalStateEntity {
        id,
        game_id: record.game.id,
        confidence: fields.confidence,
        sleep_hours: fields.sleep_hours,
        sleep_quality: fields.sleep_quality,
        stress_level: fields.stress_level,
        physical_energy: fields.physical_energy,
        notes: fields.notes,
        created_at,
        updated_at: now,
    };

    // `None` means the game was deleted after the ownership check.
    let stored = state
        .store()
        .upsert_mental_state(entity)
        .await?
        .ok_or_else(game_not_found)?;
    info!(game_id = %stored.game_id, created, "mental state saved");

    Ok(UpsertOutcome {
        mental_state: stored.into(),
        created,
    })
}

/// Change only the supplied fields of an existing mental state.
pub async fn update_mental_state(
    state: &SharedState,
    principal: &Principal,
    game_id: &str,
    input: &FieldBag,
) -> Result<MentalStateView, ServiceError> {
    let record = owned_game(state, principal, game_id).await?;
    if record.mental_state.is_none() {
        return Err(ServiceError::NotFound(MENTAL_STATE_NOT_FOUND.into()));
    }
    let patch = validate_mental_state_fields(input, ValidationMode::Patch)?;

    let updated = state
        .store()
        .update_mental_state(record.game.id, patch, SystemTime::now())
        .await?
        .ok_or_else(|| ServiceError::NotFound(MENTAL_STATE_NOT_FOUND.into()))?;
    info!(game_id = %updated.game_id, "mental state updated");

    Ok(updated.into())
}
