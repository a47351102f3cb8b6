use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::core::{MatchError, MatchResult};

/// Sentinel preference value meaning "accept every gender"
pub const ANY_GENDER: &str = "any";

/// One entity being matched: a similarity vector plus orientation data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub scores: Vec<f64>,
    pub gender: String,
    #[serde(default)]
    pub preference: GenderPreference,
}

impl Participant {
    pub fn new(id: impl Into<String>, scores: Vec<f64>, gender: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            scores,
            gender: gender.into(),
            preference: GenderPreference::Any,
        }
    }

    pub fn with_preference(mut self, preference: GenderPreference) -> Self {
        self.preference = preference;
        self
    }

    /// Whether this participant accepts `other` as a partner
    #[inline]
    pub fn accepts(&self, other: &Participant) -> bool {
        self.preference.accepts(&other.gender)
    }
}

/// Accepted-partner genders
///
/// On the wire this is a plain list of strings. A list containing `"any"`
/// collapses to [`GenderPreference::Any`]; an empty list accepts nobody.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum GenderPreference {
    #[default]
    Any,
    Only(BTreeSet<String>),
}

impl GenderPreference {
    pub fn only<I, S>(genders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from(genders.into_iter().map(Into::into).collect::<Vec<String>>())
    }

    #[inline]
    pub fn accepts(&self, gender: &str) -> bool {
        match self {
            GenderPreference::Any => true,
            GenderPreference::Only(genders) => genders.contains(gender),
        }
    }
}

impl From<Vec<String>> for GenderPreference {
    fn from(values: Vec<String>) -> Self {
        if values.iter().any(|v| v == ANY_GENDER) {
            GenderPreference::Any
        } else {
            GenderPreference::Only(values.into_iter().collect())
        }
    }
}

impl From<GenderPreference> for Vec<String> {
    fn from(value: GenderPreference) -> Self {
        match value {
            GenderPreference::Any => vec![ANY_GENDER.to_string()],
            GenderPreference::Only(genders) => genders.into_iter().collect(),
        }
    }
}

/// Which matching round produced a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairRound {
    /// Platonic run, or romantic round 1 with orientation honored
    Primary,
    /// Romantic round 2: orientation relaxed, may violate either party's preference
    Fallback,
    /// Self-pair for the single participant left over
    Leftover,
}

/// Unordered pair of participant ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    #[serde(rename = "user1")]
    pub first: String,
    #[serde(rename = "user2")]
    pub second: String,
    pub round: PairRound,
}

impl Pair {
    pub fn new(first: impl Into<String>, second: impl Into<String>, round: PairRound) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            round,
        }
    }

    pub fn self_pair(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            first: id.clone(),
            second: id,
            round: PairRound::Leftover,
        }
    }

    pub fn is_self_pair(&self) -> bool {
        self.first == self.second
    }

    pub fn contains(&self, id: &str) -> bool {
        self.first == id || self.second == id
    }
}

/// Room type, selecting the matching mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Platonic,
    Romantic,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Platonic => "platonic",
            RoomType::Romantic => "romantic",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "platonic" => Ok(RoomType::Platonic),
            "romantic" => Ok(RoomType::Romantic),
            _ => Err(MatchError::InvalidMode(s.to_string())),
        }
    }
}

/// A matching room
#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub id: uuid::Uuid,
    pub name: String,
    pub code: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub active: bool,
    pub participants: Vec<Participant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<MatchResult>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Room {
    pub fn has_participant(&self, id: &str) -> bool {
        self.participants.iter().any(|p| p.id == id)
    }

    /// Score dimension fixed by the first participant to join
    pub fn dimension(&self) -> Option<usize> {
        self.participants.first().map(|p| p.scores.len())
    }
}
