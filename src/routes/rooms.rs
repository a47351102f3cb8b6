use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::MatchError;
use crate::models::{
    CreateRoomRequest, ErrorResponse, HealthResponse, JoinRoomRequest, MatchesResponse, ParticipantMatchResponse,
    RoomDataResponse, RoomLoginRequest, RoomLoginResponse, RoomResponse, RoomType, VerifyRoomRequest,
    VerifyRoomResponse,
};
use crate::services::{RoomError, RoomRegistry};

/// Header carrying the room password on owner-only endpoints
pub const ROOM_PASSWORD_HEADER: &str = "x-room-password";

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
}

/// Configure all room-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/rooms", web::post().to(create_room))
        .route("/rooms/login", web::post().to(login_room))
        .route("/rooms/verify", web::post().to(verify_room))
        .route("/rooms/{code}", web::get().to(get_room))
        .route("/rooms/{code}/participants", web::post().to(join_room))
        .route(
            "/rooms/{code}/participants/{id}/match",
            web::get().to(participant_match),
        )
        .route("/rooms/{code}/matches", web::post().to(create_matches));
}

/// Map a registry error onto an HTTP response
pub fn error_response(err: &RoomError) -> HttpResponse {
    let (status, error) = match err {
        RoomError::NotFound(_) => (StatusCode::NOT_FOUND, "Room not found"),
        RoomError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid room credentials"),
        RoomError::CodeTaken(_) => (StatusCode::CONFLICT, "Room code already exists"),
        RoomError::RoomInactive(_) => (StatusCode::CONFLICT, "Room is no longer active"),
        RoomError::RoomStillActive(_) => (StatusCode::CONFLICT, "Room is still active"),
        RoomError::AlreadyJoined { .. } => (StatusCode::CONFLICT, "Already in room"),
        RoomError::ParticipantNotFound { .. } => (StatusCode::NOT_FOUND, "Participant not found"),
        RoomError::NoMatch { .. } => (StatusCode::NOT_FOUND, "No match found"),
        RoomError::InvalidCode(_) => (StatusCode::BAD_REQUEST, "Invalid room code"),
        RoomError::Match(MatchError::InvalidMode(_)) => (StatusCode::BAD_REQUEST, "Invalid room type"),
        RoomError::Match(MatchError::TooManyParticipants { .. }) => {
            (StatusCode::BAD_REQUEST, "Too many participants")
        }
        RoomError::Match(MatchError::InvalidInput(_)) => (StatusCode::BAD_REQUEST, "Invalid participant data"),
    };

    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: err.to_string(),
        status_code: status.as_u16(),
    })
}

/// Room password from the request headers
fn room_password(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(ROOM_PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok())
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        rooms: state.registry.len().await,
        timestamp: chrono::Utc::now(),
    })
}

/// Create room endpoint
///
/// POST /api/v1/rooms
///
/// Request body:
/// ```json
/// {
///   "name": "string",
///   "code": "abc123",
///   "password": "string",
///   "type": "platonic|romantic"
/// }
/// ```
async fn create_room(
    state: web::Data<AppState>,
    req: web::Json<CreateRoomRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let req = req.into_inner();
    let room_type = match req.room_type.parse::<RoomType>() {
        Ok(room_type) => room_type,
        Err(e) => return error_response(&RoomError::from(e)),
    };

    match state
        .registry
        .create_room(req.name, req.code, req.password, room_type)
        .await
    {
        Ok(room) => HttpResponse::Created().json(RoomResponse::from(&room)),
        Err(e) => {
            tracing::info!("Room creation rejected: {}", e);
            error_response(&e)
        }
    }
}

/// Room login endpoint
///
/// POST /api/v1/rooms/login
async fn login_room(
    state: web::Data<AppState>,
    req: web::Json<RoomLoginRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    match state.registry.login(&req.code, &req.password).await {
        Ok(room) => HttpResponse::Ok().json(RoomLoginResponse {
            message: "Login successful".to_string(),
            room_id: room.id,
            active: room.active,
        }),
        Err(e) => error_response(&e),
    }
}

/// Verify that a room exists and is still open
///
/// POST /api/v1/rooms/verify
async fn verify_room(
    state: web::Data<AppState>,
    req: web::Json<VerifyRoomRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    match state.registry.verify(&req.code).await {
        Ok(room) => HttpResponse::Ok().json(VerifyRoomResponse {
            room_id: room.id,
            code: room.code,
            name: room.name,
        }),
        Err(e) => error_response(&e),
    }
}

/// Room data endpoint
///
/// GET /api/v1/rooms/{code}
///
/// Requires the room password in the `x-room-password` header.
async fn get_room(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: HttpRequest,
) -> impl Responder {
    let Some(password) = room_password(&req) else {
        return error_response(&RoomError::InvalidCredentials);
    };

    match state.registry.login(&path, password).await {
        Ok(room) => HttpResponse::Ok().json(RoomDataResponse::from(&room)),
        Err(e) => error_response(&e),
    }
}

/// Join room endpoint
///
/// POST /api/v1/rooms/{code}/participants
///
/// Request body:
/// ```json
/// {
///   "id": "string",
///   "name": "string",
///   "scores": [0.5, 1.0],
///   "gender": "female",
///   "preference": ["male", "female"]
/// }
/// ```
async fn join_room(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<JoinRoomRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for join request on room {}: {:?}", path, errors);
        return validation_failed(errors);
    }

    let participant = req.into_inner().into_participant();
    match state.registry.join(&path, participant).await {
        Ok(room) => HttpResponse::Ok().json(RoomResponse::from(&room)),
        Err(e) => error_response(&e),
    }
}

/// Participant match lookup
///
/// GET /api/v1/rooms/{code}/participants/{id}/match
async fn participant_match(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (code, participant_id) = path.into_inner();

    match state.registry.match_for(&code, &participant_id).await {
        Ok((partner, round)) => HttpResponse::Ok().json(ParticipantMatchResponse {
            room_code: code,
            partner: (&partner).into(),
            round,
        }),
        Err(e) => error_response(&e),
    }
}

/// Close a room and compute its matches
///
/// POST /api/v1/rooms/{code}/matches
///
/// Requires the room password in the `x-room-password` header. Runs once per
/// room; later calls get 409.
async fn create_matches(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: HttpRequest,
) -> impl Responder {
    let Some(password) = room_password(&req) else {
        return error_response(&RoomError::InvalidCredentials);
    };

    match state.registry.close_and_match(&path, password).await {
        Ok(room) => HttpResponse::Ok().json(MatchesResponse::from(&room)),
        Err(e) => {
            tracing::error!("Failed to create matches for room {}: {}", path, e);
            error_response(&e)
        }
    }
}
