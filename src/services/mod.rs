// Service exports
pub mod rooms;

pub use rooms::{validate_code, RoomError, RoomRegistry};
