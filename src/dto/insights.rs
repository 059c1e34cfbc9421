use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{GameEntity, GameResult},
    dto::format_day,
};

/// Dashboard summary of a player's season.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    pub total_games: usize,
    /// Average points per game, one decimal.
    pub avg_points: f64,
    /// Average confidence over games with a mental state; `null` when there are none.
    pub avg_confidence: Option<f64>,
    /// Average hours of sleep over games with a mental state; `null` when there are none.
    pub avg_sleep: Option<f64>,
    pub insights: Vec<Insight>,
    pub recent_games: Vec<RecentGame>,
}

/// Comparison between two groups of games.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Insight {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentGame {
    pub id: Uuid,
    /// Day of the game, `YYYY-MM-DD`.
    pub date: String,
    pub opponent: String,
    pub result: GameResult,
    pub points: u32,
    pub plus_minus: i32,
}

impl From<&GameEntity> for RecentGame {
    fn from(game: &GameEntity) -> Self {
        Self {
            id: game.id,
            date: format_day(game.date),
            opponent: game.opponent.clone(),
            result: game.result,
            points: game.points(),
            plus_minus: game.plus_minus,
        }
    }
}
