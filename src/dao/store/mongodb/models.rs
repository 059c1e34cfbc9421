use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MongoDaoError;
use crate::dao::models::{
    GameEntity, GameResult, HomeAway, MentalStateEntity, Position, UserEntity,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    #[serde(rename = "_id")]
    id: String,
    email: String,
    password_hash: String,
    name: String,
    team: String,
    position: Position,
    created_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    date: DateTime,
    opponent: String,
    home_away: HomeAway,
    result: GameResult,
    goals: u32,
    assists: u32,
    shots: u32,
    plus_minus: i32,
    ice_time: f64,
    created_at: DateTime,
    updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMentalStateDocument {
    #[serde(rename = "_id")]
    id: String,
    pub game_id: String,
    confidence: u8,
    sleep_hours: f64,
    sleep_quality: u8,
    stress_level: u8,
    physical_energy: u8,
    notes: Option<String>,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<UserEntity> for MongoUserDocument {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id.to_string(),
            email: value.email,
            password_hash: value.password_hash,
            name: value.name,
            team: value.team,
            position: value.position,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoUserDocument> for UserEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoUserDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&value.id)?,
            email: value.email,
            password_hash: value.password_hash,
            name: value.name,
            team: value.team,
            position: value.position,
            created_at: value.created_at.to_system_time(),
        })
    }
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            date: DateTime::from_system_time(value.date),
            opponent: value.opponent,
            home_away: value.home_away,
            result: value.result,
            goals: value.goals,
            assists: value.assists,
            shots: value.shots,
            plus_minus: value.plus_minus,
            ice_time: value.ice_time,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<MongoGameDocument> for GameEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoGameDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&value.id)?,
            user_id: parse_id(&value.user_id)?,
            date: value.date.to_system_time(),
            opponent: value.opponent,
            home_away: value.home_away,
            result: value.result,
            goals: value.goals,
            assists: value.assists,
            shots: value.shots,
            plus_minus: value.plus_minus,
            ice_time: value.ice_time,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

impl From<MentalStateEntity> for MongoMentalStateDocument {
    fn from(value: MentalStateEntity) -> Self {
        Self {
            id: value.id.to_string(),
            game_id: value.game_id.to_string(),
            confidence: value.confidence,
            sleep_hours: value.sleep_hours,
            sleep_quality: value.sleep_quality,
            stress_level: value.stress_level,
            physical_energy: value.physical_energy,
            notes: value.notes,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<MongoMentalStateDocument> for MentalStateEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoMentalStateDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&value.id)?,
            game_id: parse_id(&value.game_id)?,
            confidence: value.confidence,
            sleep_hours: value.sleep_hours,
            sleep_quality: value.sleep_quality,
            stress_level: value.stress_level,
            physical_energy: value.physical_energy,
            notes: value.notes,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

fn parse_id(value: &str) -> Result<Uuid, MongoDaoError> {
    Uuid::parse_str(value).map_err(|source| MongoDaoError::InvalidId {
        value: value.to_owned(),
        source,
    })
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

pub fn game_ref(game_id: Uuid) -> Document {
    doc! {"game_id": game_id.to_string()}
}
