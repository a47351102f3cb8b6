use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::core::{validate_scores, MatchError, Matcher};
use crate::models::{PairRound, Participant, Room, RoomType};

/// Maximum room code length
pub const MAX_CODE_LEN: usize = 8;

/// Errors that can occur during the room lifecycle
#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Room not found: {0}")]
    NotFound(String),

    #[error("Invalid room code {0:?}: use 1-8 lowercase letters and digits")]
    InvalidCode(String),

    #[error("Room code already exists: {0}")]
    CodeTaken(String),

    #[error("Invalid room credentials")]
    InvalidCredentials,

    #[error("Room is no longer active: {0}")]
    RoomInactive(String),

    #[error("Room has not been matched yet: {0}")]
    RoomStillActive(String),

    #[error("Participant {participant_id} is already in room {code}")]
    AlreadyJoined { code: String, participant_id: String },

    #[error("Participant {participant_id} is not in room {code}")]
    ParticipantNotFound { code: String, participant_id: String },

    #[error("Participant {participant_id} has no partner in room {code}")]
    NoMatch { code: String, participant_id: String },

    #[error(transparent)]
    Match(#[from] MatchError),
}

/// Check the room code format: 1-8 characters of `[a-z0-9]`
pub fn validate_code(code: &str) -> bool {
    (1..=MAX_CODE_LEN).contains(&code.len())
        && code.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// In-memory room registry
///
/// Rooms are keyed by code. Closing a room holds the write lock across the
/// active check, the matching run, storing the result and the deactivation,
/// so each room is matched at most once.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, Room>>,
    matcher: Matcher,
}

impl RoomRegistry {
    pub fn new(matcher: Matcher) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            matcher,
        }
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }

    /// Create a new active room with no participants
    pub async fn create_room(
        &self,
        name: String,
        code: String,
        password: String,
        room_type: RoomType,
    ) -> Result<Room, RoomError> {
        if !validate_code(&code) {
            return Err(RoomError::InvalidCode(code));
        }

        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&code) {
            return Err(RoomError::CodeTaken(code));
        }

        let room = Room {
            id: uuid::Uuid::new_v4(),
            name,
            code: code.clone(),
            password,
            room_type,
            active: true,
            participants: Vec::new(),
            matches: None,
            created_at: chrono::Utc::now(),
        };
        rooms.insert(code, room.clone());

        tracing::info!("Created {} room {} ({})", room.room_type, room.code, room.id);
        Ok(room)
    }

    /// Check room credentials
    ///
    /// Unknown codes and wrong passwords fail the same way.
    pub async fn login(&self, code: &str, password: &str) -> Result<Room, RoomError> {
        let rooms = self.rooms.read().await;
        match rooms.get(code) {
            Some(room) if room.password == password => Ok(room.clone()),
            _ => {
                tracing::debug!("Rejected login for room {}", code);
                Err(RoomError::InvalidCredentials)
            }
        }
    }

    /// Look up a room that is still accepting participants
    pub async fn verify(&self, code: &str) -> Result<Room, RoomError> {
        let rooms = self.rooms.read().await;
        let room = rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.to_string()))?;

        if !room.active {
            return Err(RoomError::RoomInactive(code.to_string()));
        }
        Ok(room.clone())
    }

    pub async fn get(&self, code: &str) -> Result<Room, RoomError> {
        self.rooms
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.to_string()))
    }

    /// Add a participant snapshot to an active room
    pub async fn join(&self, code: &str, participant: Participant) -> Result<Room, RoomError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.to_string()))?;

        if !room.active {
            return Err(RoomError::RoomInactive(code.to_string()));
        }
        if room.has_participant(&participant.id) {
            return Err(RoomError::AlreadyJoined {
                code: code.to_string(),
                participant_id: participant.id,
            });
        }

        validate_scores(std::slice::from_ref(&participant))?;
        if let Some(dimension) = room.dimension() {
            if participant.scores.len() != dimension {
                return Err(MatchError::InvalidInput(format!(
                    "participant {} has {} scores, room {} uses {}",
                    participant.id,
                    participant.scores.len(),
                    code,
                    dimension
                ))
                .into());
            }
        }

        tracing::info!("Participant {} joined room {}", participant.id, code);
        room.participants.push(participant);
        Ok(room.clone())
    }

    /// Run the room's single matching pass and deactivate it
    ///
    /// Only the room owner may close it, so `password` must match. A room that
    /// is already inactive is rejected. If the matcher rejects the
    /// participants the room stays active and nothing is stored.
    pub async fn close_and_match(&self, code: &str, password: &str) -> Result<Room, RoomError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.to_string()))?;

        if room.password != password {
            tracing::info!("Rejected close of room {}: bad credentials", code);
            return Err(RoomError::InvalidCredentials);
        }
        if !room.active {
            return Err(RoomError::RoomInactive(code.to_string()));
        }

        let result = self
            .matcher
            .compute_matches(room.room_type, &room.participants)?;

        tracing::info!(
            "Matched room {}: {} pairs from {} participants",
            code,
            result.pairs.len(),
            room.participants.len()
        );
        if !result.is_complete() {
            tracing::warn!(
                "Room {} closed with {} unresolved participants",
                code,
                result.unresolved.len()
            );
        }

        room.matches = Some(result);
        room.active = false;
        Ok(room.clone())
    }

    /// Look up who `participant_id` was paired with once the room is closed
    ///
    /// Returns the partner (the participant itself for a leftover self-pair)
    /// and the round the pair was formed in.
    pub async fn match_for(
        &self,
        code: &str,
        participant_id: &str,
    ) -> Result<(Participant, PairRound), RoomError> {
        let rooms = self.rooms.read().await;
        let room = rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.to_string()))?;

        if !room.has_participant(participant_id) {
            return Err(RoomError::ParticipantNotFound {
                code: code.to_string(),
                participant_id: participant_id.to_string(),
            });
        }
        if room.active {
            return Err(RoomError::RoomStillActive(code.to_string()));
        }

        let no_match = || RoomError::NoMatch {
            code: code.to_string(),
            participant_id: participant_id.to_string(),
        };
        let result = room.matches.as_ref().ok_or_else(no_match)?;
        let round = result.pair_of(participant_id).ok_or_else(no_match)?.round;
        let partner_id = result.partner_of(participant_id).ok_or_else(no_match)?;
        let partner = room
            .participants
            .iter()
            .find(|p| p.id == partner_id)
            .ok_or_else(no_match)?;

        Ok((partner.clone(), round))
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(Matcher::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn registry_with_room(room_type: RoomType) -> RoomRegistry {
        let registry = RoomRegistry::default();
        registry
            .create_room("Friday mixer".to_string(), "fri1".to_string(), "secret".to_string(), room_type)
            .await
            .unwrap();
        registry
    }

    #[test]
    fn test_validate_code() {
        assert!(validate_code("abc123"));
        assert!(validate_code("a"));
        assert!(validate_code("12345678"));
        assert!(!validate_code(""));
        assert!(!validate_code("123456789"));
        assert!(!validate_code("ABC"));
        assert!(!validate_code("a-b"));
        assert!(!validate_code("café"));
    }

    #[tokio::test]
    async fn test_create_room_rejects_duplicates_and_bad_codes() {
        let registry = registry_with_room(RoomType::Platonic).await;

        let dup = registry
            .create_room("Other".to_string(), "fri1".to_string(), "pw".to_string(), RoomType::Romantic)
            .await;
        assert!(matches!(dup, Err(RoomError::CodeTaken(_))));

        let bad = registry
            .create_room("Other".to_string(), "Bad Code".to_string(), "pw".to_string(), RoomType::Romantic)
            .await;
        assert!(matches!(bad, Err(RoomError::InvalidCode(_))));

        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_login() {
        let registry = registry_with_room(RoomType::Platonic).await;

        let room = registry.login("fri1", "secret").await.unwrap();
        assert!(room.active);

        assert!(matches!(registry.login("fri1", "wrong").await, Err(RoomError::InvalidCredentials)));
        assert!(matches!(registry.login("nope", "secret").await, Err(RoomError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_join_rules() {
        let registry = registry_with_room(RoomType::Platonic).await;

        registry
            .join("fri1", Participant::new("a", vec![1.0, 2.0], "female"))
            .await
            .unwrap();

        let twice = registry
            .join("fri1", Participant::new("a", vec![1.0, 2.0], "female"))
            .await;
        assert!(matches!(twice, Err(RoomError::AlreadyJoined { .. })));

        let wrong_dim = registry
            .join("fri1", Participant::new("b", vec![1.0], "male"))
            .await;
        assert!(matches!(wrong_dim, Err(RoomError::Match(MatchError::InvalidInput(_)))));

        let missing = registry
            .join("nope", Participant::new("c", vec![1.0, 2.0], "male"))
            .await;
        assert!(matches!(missing, Err(RoomError::NotFound(_))));

        assert_eq!(registry.get("fri1").await.unwrap().participants.len(), 1);
    }

    #[tokio::test]
    async fn test_close_runs_once() {
        let registry = registry_with_room(RoomType::Platonic).await;
        for (id, score) in [("a", 0.0), ("b", 1.0), ("c", 7.0)] {
            registry
                .join("fri1", Participant::new(id, vec![score], "female"))
                .await
                .unwrap();
        }

        assert!(matches!(
            registry.close_and_match("fri1", "wrong").await,
            Err(RoomError::InvalidCredentials)
        ));
        assert!(registry.get("fri1").await.unwrap().active);

        let closed = registry.close_and_match("fri1", "secret").await.unwrap();
        assert!(!closed.active);
        let matches = closed.matches.unwrap();
        assert_eq!(matches.pairs.len(), 2);
        assert!(matches.self_pair().is_some());

        assert!(matches!(
            registry.close_and_match("fri1", "secret").await,
            Err(RoomError::RoomInactive(_))
        ));
        assert!(matches!(registry.verify("fri1").await, Err(RoomError::RoomInactive(_))));

        let late = registry
            .join("fri1", Participant::new("d", vec![3.0], "male"))
            .await;
        assert!(matches!(late, Err(RoomError::RoomInactive(_))));
    }

    #[tokio::test]
    async fn test_concurrent_closes_match_once() {
        let registry = Arc::new(registry_with_room(RoomType::Romantic).await);
        for i in 0..6 {
            let gender = if i % 2 == 0 { "female" } else { "male" };
            registry
                .join("fri1", Participant::new(format!("p{}", i), vec![i as f64], gender))
                .await
                .unwrap();
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move { registry.close_and_match("fri1", "secret").await })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(RoomError::RoomInactive(_)) => {}
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(succeeded, 1);
    }

    #[tokio::test]
    async fn test_match_for_participant() {
        let registry = registry_with_room(RoomType::Platonic).await;
        for (id, score) in [("a", 0.0), ("b", 1.0), ("c", 9.0)] {
            registry
                .join("fri1", Participant::new(id, vec![score], "female"))
                .await
                .unwrap();
        }

        assert!(matches!(
            registry.match_for("fri1", "a").await,
            Err(RoomError::RoomStillActive(_))
        ));

        registry.close_and_match("fri1", "secret").await.unwrap();

        let (partner, round) = registry.match_for("fri1", "a").await.unwrap();
        assert_eq!(partner.id, "b");
        assert_eq!(round, PairRound::Primary);

        let (partner, round) = registry.match_for("fri1", "c").await.unwrap();
        assert_eq!(partner.id, "c");
        assert_eq!(round, PairRound::Leftover);

        assert!(matches!(
            registry.match_for("fri1", "zed").await,
            Err(RoomError::ParticipantNotFound { .. })
        ));
        assert!(matches!(registry.match_for("nope", "a").await, Err(RoomError::NotFound(_))));
    }
}
