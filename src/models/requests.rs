use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{GenderPreference, Participant};

/// Request to create a room
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRoomRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1, max = 8))]
    pub code: String,
    #[validate(length(min = 1))]
    pub password: String,
    /// "platonic" or "romantic"; parsed by the handler
    #[serde(rename = "type")]
    pub room_type: String,
}

/// Room login with code and password
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RoomLoginRequest {
    #[validate(length(min = 1))]
    pub code: String,
    pub password: String,
}

/// Check that a room exists and is still open
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyRoomRequest {
    #[validate(length(min = 1))]
    pub code: String,
}

/// Join a room with a participant snapshot
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JoinRoomRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "userId", rename = "id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub scores: Vec<f64>,
    #[validate(length(min = 1))]
    pub gender: String,
    #[serde(default)]
    pub preference: GenderPreference,
}

impl JoinRoomRequest {
    pub fn into_participant(self) -> Participant {
        Participant {
            id: self.id,
            name: self.name,
            scores: self.scores,
            gender: self.gender,
            preference: self.preference,
        }
    }
}
