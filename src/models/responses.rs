use serde::{Deserialize, Serialize};

use crate::models::domain::{PairRound, Participant, Room, RoomType};

/// Public view of a room (never includes the password)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomResponse {
    pub id: uuid::Uuid,
    pub name: String,
    pub code: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub active: bool,
    #[serde(rename = "participantCount")]
    pub participant_count: usize,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Room> for RoomResponse {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id,
            name: room.name.clone(),
            code: room.code.clone(),
            room_type: room.room_type,
            active: room.active,
            participant_count: room.participants.len(),
            created_at: room.created_at,
        }
    }
}

/// Response for room login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomLoginResponse {
    pub message: String,
    #[serde(rename = "roomId")]
    pub room_id: uuid::Uuid,
    pub active: bool,
}

/// Response for room verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRoomResponse {
    #[serde(rename = "roomId")]
    pub room_id: uuid::Uuid,
    pub code: String,
    pub name: String,
}

/// Participant fields shown next to a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantSummary {
    pub id: String,
    pub name: Option<String>,
    pub gender: String,
}

impl From<&Participant> for ParticipantSummary {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            gender: p.gender.clone(),
        }
    }
}

/// A stored pair with both participants resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulatedPair {
    pub user1: ParticipantSummary,
    pub user2: ParticipantSummary,
    pub round: PairRound,
}

/// Resolve a room's stored matches against its participants
pub fn populate_matches(room: &Room) -> Vec<PopulatedPair> {
    let Some(result) = &room.matches else {
        return Vec::new();
    };

    let find = |id: &str| room.participants.iter().find(|p| p.id == id);

    result
        .pairs
        .iter()
        .filter_map(|pair| {
            Some(PopulatedPair {
                user1: find(pair.first.as_str())?.into(),
                user2: find(pair.second.as_str())?.into(),
                round: pair.round,
            })
        })
        .collect()
}

/// Response after closing a room and matching it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchesResponse {
    pub room: RoomResponse,
    pub matches: Vec<PopulatedPair>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

impl From<&Room> for MatchesResponse {
    fn from(room: &Room) -> Self {
        Self {
            room: room.into(),
            matches: populate_matches(room),
            unresolved: room
                .matches
                .as_ref()
                .map(|m| m.unresolved.clone())
                .unwrap_or_default(),
        }
    }
}

/// Room data: participants always, matches once the room is inactive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDataResponse {
    pub room: RoomResponse,
    pub participants: Vec<ParticipantSummary>,
    pub matches: Vec<PopulatedPair>,
}

impl From<&Room> for RoomDataResponse {
    fn from(room: &Room) -> Self {
        let matches = if room.active {
            Vec::new()
        } else {
            populate_matches(room)
        };

        Self {
            room: room.into(),
            participants: room.participants.iter().map(Into::into).collect(),
            matches,
        }
    }
}

/// One participant's match in a closed room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantMatchResponse {
    #[serde(rename = "roomCode")]
    pub room_code: String,
    pub partner: ParticipantSummary,
    pub round: PairRound,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub rooms: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
