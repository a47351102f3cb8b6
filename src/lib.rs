//! Duo Match - room-based pairing service
//!
//! This library provides the pairing engine behind matching rooms. Participants
//! are ranked by score-vector similarity and paired one-to-one with an
//! everyone-proposes process; romantic rooms honor gender preferences first and
//! fall back to a relaxed round for whoever is left.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{MatchError, MatchResult, Matcher};
pub use models::{GenderPreference, Pair, PairRound, Participant, RoomType};
pub use services::{RoomError, RoomRegistry};
