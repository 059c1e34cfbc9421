use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{GameRecord, GameResult, HomeAway},
    dto::{format_system_time, mental::MentalStateView},
};

/// Game as returned to clients, with its mental state check-in when one exists.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub id: Uuid,
    pub user_id: Uuid,
    /// RFC 3339 timestamp of the game.
    pub date: String,
    pub opponent: String,
    pub home_away: HomeAway,
    pub result: GameResult,
    pub goals: u32,
    pub assists: u32,
    pub shots: u32,
    pub plus_minus: i32,
    /// Minutes on ice.
    pub ice_time: f64,
    /// Goals plus assists.
    pub points: u32,
    pub created_at: String,
    pub updated_at: String,
    pub mental_state: Option<MentalStateView>,
}

impl From<GameRecord> for GameView {
    fn from(record: GameRecord) -> Self {
        let GameRecord { game, mental_state } = record;
        Self {
            points: game.points(),
            id: game.id,
            user_id: game.user_id,
            date: format_system_time(game.date),
            opponent: game.opponent,
            home_away: game.home_away,
            result: game.result,
            goals: game.goals,
            assists: game.assists,
            shots: game.shots,
            plus_minus: game.plus_minus,
            ice_time: game.ice_time,
            created_at: format_system_time(game.created_at),
            updated_at: format_system_time(game.updated_at),
            mental_state: mental_state.map(Into::into),
        }
    }
}

/// Request body for creating or updating a game.
///
/// Only documents the accepted shape; payloads are validated field by field so every field is
/// optional here. `date`, `opponent`, `homeAway` and `result` are required on creation.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameInput {
    /// `YYYY-MM-DD` or RFC 3339; must not be in the future.
    #[schema(example = "2024-01-01")]
    pub date: Option<String>,
    pub opponent: Option<String>,
    pub home_away: Option<HomeAway>,
    pub result: Option<GameResult>,
    #[schema(minimum = 0)]
    pub goals: Option<u32>,
    #[schema(minimum = 0)]
    pub assists: Option<u32>,
    #[schema(minimum = 0)]
    pub shots: Option<u32>,
    pub plus_minus: Option<i32>,
    #[schema(minimum = 0)]
    pub ice_time: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GameListResponse {
    pub games: Vec<GameView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GameResponse {
    pub game: GameView,
}

/// Confirmation message together with the affected game.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameMessageResponse {
    pub message: String,
    pub game: GameView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
