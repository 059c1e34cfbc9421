use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dao::models::MentalStateEntity, dto::format_system_time};

/// Post-game mental check-in as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MentalStateView {
    pub id: Uuid,
    pub game_id: Uuid,
    pub confidence: u8,
    pub sleep_hours: f64,
    pub sleep_quality: u8,
    pub stress_level: u8,
    pub physical_energy: u8,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<MentalStateEntity> for MentalStateView {
    fn from(state: MentalStateEntity) -> Self {
        Self {
            id: state.id,
            game_id: state.game_id,
            confidence: state.confidence,
            sleep_hours: state.sleep_hours,
            sleep_quality: state.sleep_quality,
            stress_level: state.stress_level,
            physical_energy: state.physical_energy,
            notes: state.notes,
            created_at: format_system_time(state.created_at),
            updated_at: format_system_time(state.updated_at),
        }
    }
}

/// Request body for recording a mental state. All fields but `notes` are required on creation;
/// on update only supplied fields change and `notes: null` clears the notes.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MentalStateInput {
    #[schema(minimum = 1, maximum = 10)]
    pub confidence: Option<u8>,
    #[schema(minimum = 0, maximum = 24)]
    pub sleep_hours: Option<f64>,
    #[schema(minimum = 1, maximum = 10)]
    pub sleep_quality: Option<u8>,
    #[schema(minimum = 1, maximum = 10)]
    pub stress_level: Option<u8>,
    #[schema(minimum = 1, maximum = 10)]
    pub physical_energy: Option<u8>,
    #[schema(max_length = 500)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MentalStateMessageResponse {
    pub message: String,
    pub mental_state: MentalStateView,
}
