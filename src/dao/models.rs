use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Venue of a game from the player's point of view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HomeAway {
    Home,
    Away,
}

impl HomeAway {
    /// Parse the wire representation (`home` / `away`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "home" => Some(Self::Home),
            "away" => Some(Self::Away),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Away => "away",
        }
    }
}

/// Final outcome of a game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Loss,
}

impl GameResult {
    /// Parse the wire representation (`win` / `loss`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "win" => Some(Self::Win),
            "loss" => Some(Self::Loss),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loss => "loss",
        }
    }
}

/// Playing position declared at signup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum Position {
    Center,
    #[serde(rename = "Left Wing")]
    LeftWing,
    #[serde(rename = "Right Wing")]
    RightWing,
    Defenseman,
    Goalie,
}

impl Position {
    /// Parse the display name used on the wire (e.g. `Left Wing`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Center" => Some(Self::Center),
            "Left Wing" => Some(Self::LeftWing),
            "Right Wing" => Some(Self::RightWing),
            "Defenseman" => Some(Self::Defenseman),
            "Goalie" => Some(Self::Goalie),
            _ => None,
        }
    }
}

/// Registered player account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Primary key of the user.
    pub id: Uuid,
    /// Unique login email, stored trimmed and lowercased.
    pub email: String,
    /// bcrypt hash of the password. Never leaves the service layer.
    pub password_hash: String,
    pub name: String,
    pub team: String,
    pub position: Position,
    pub created_at: SystemTime,
}

/// Per-game statistics logged by a player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Owner of the game.
    pub user_id: Uuid,
    /// When the game was played; never later than the time it was recorded.
    pub date: SystemTime,
    pub opponent: String,
    pub home_away: HomeAway,
    pub result: GameResult,
    pub goals: u32,
    pub assists: u32,
    pub shots: u32,
    pub plus_minus: i32,
    /// Ice time in minutes.
    pub ice_time: f64,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl GameEntity {
    /// Points scored in the game (goals plus assists).
    pub fn points(&self) -> u32 {
        self.goals.saturating_add(self.assists)
    }
}

/// Post-game mental check-in, linked one-to-one with a game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MentalStateEntity {
    pub id: Uuid,
    /// Game this check-in belongs to. Unique across all mental states.
    pub game_id: Uuid,
    pub confidence: u8,
    pub sleep_hours: f64,
    pub sleep_quality: u8,
    pub stress_level: u8,
    pub physical_energy: u8,
    pub notes: Option<String>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// A game joined with its optional mental state, as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub game: GameEntity,
    pub mental_state: Option<MentalStateEntity>,
}

/// Partial update of a game. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamePatch {
    pub date: Option<SystemTime>,
    pub opponent: Option<String>,
    pub home_away: Option<HomeAway>,
    pub result: Option<GameResult>,
    pub goals: Option<u32>,
    pub assists: Option<u32>,
    pub shots: Option<u32>,
    pub plus_minus: Option<i32>,
    pub ice_time: Option<f64>,
}

impl GamePatch {
    /// Overwrite the fields present in the patch.
    pub fn apply(&self, game: &mut GameEntity) {
        if let Some(date) = self.date {
            game.date = date;
        }
        if let Some(opponent) = &self.opponent {
            game.opponent = opponent.clone();
        }
        if let Some(home_away) = self.home_away {
            game.home_away = home_away;
        }
        if let Some(result) = self.result {
            game.result = result;
        }
        if let Some(goals) = self.goals {
            game.goals = goals;
        }
        if let Some(assists) = self.assists {
            game.assists = assists;
        }
        if let Some(shots) = self.shots {
            game.shots = shots;
        }
        if let Some(plus_minus) = self.plus_minus {
            game.plus_minus = plus_minus;
        }
        if let Some(ice_time) = self.ice_time {
            game.ice_time = ice_time;
        }
    }
}

/// Partial update of a mental state.
///
/// `notes` distinguishes "leave as is" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MentalStatePatch {
    pub confidence: Option<u8>,
    pub sleep_hours: Option<f64>,
    pub sleep_quality: Option<u8>,
    pub stress_level: Option<u8>,
    pub physical_energy: Option<u8>,
    pub notes: Option<Option<String>>,
}

impl MentalStatePatch {
    /// Overwrite the fields present in the patch.
    pub fn apply(&self, state: &mut MentalStateEntity) {
        if let Some(confidence) = self.confidence {
            state.confidence = confidence;
        }
        if let Some(sleep_hours) = self.sleep_hours {
            state.sleep_hours = sleep_hours;
        }
        if let Some(sleep_quality) = self.sleep_quality {
            state.sleep_quality = sleep_quality;
        }
        if let Some(stress_level) = self.stress_level {
            state.stress_level = stress_level;
        }
        if let Some(physical_energy) = self.physical_energy {
            state.physical_energy = physical_energy;
        }
        if let Some(notes) = &self.notes {
            state.notes = notes.clone();
        }
    }
}
