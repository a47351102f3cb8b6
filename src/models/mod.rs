// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{GenderPreference, Pair, PairRound, Participant, Room, RoomType, ANY_GENDER};
pub use requests::{CreateRoomRequest, JoinRoomRequest, RoomLoginRequest, VerifyRoomRequest};
pub use responses::{
    ErrorResponse, HealthResponse, MatchesResponse, ParticipantMatchResponse, ParticipantSummary, PopulatedPair,
    RoomDataResponse, RoomLoginResponse, RoomResponse, VerifyRoomResponse,
};
