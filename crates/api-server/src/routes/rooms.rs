//! Room catalog endpoints
//!
//! Students read availability; everything that mutates the catalog is
//! admin-only.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hostel_core::ledger::LedgerStore;
use hostel_core::room::Room;

use super::{core_error, not_found, require_admin, require_session, RouteError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomRequest {
    name: String,
    capacity: u32,
    #[serde(default)]
    occupants: u32,
}

#[derive(Debug, Deserialize)]
struct UpdateRoomRequest {
    #[serde(default)]
    capacity: Option<u32>,
    #[serde(default)]
    occupants: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoomResponse {
    id: Uuid,
    name: String,
    capacity: u32,
    occupants: u32,
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            name: room.name,
            capacity: room.capacity,
            occupants: room.occupants,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OccupantResponse {
    request_id: Uuid,
    student_id: String,
    student_name: String,
    student_email: String,
}

/// GET /api/rooms - List the room catalog
async fn list_rooms(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<RoomResponse>>, RouteError> {
    require_session(&headers)?;

    let rooms = state.ledger().list_rooms().await.map_err(core_error)?;
    Ok(Json(rooms.into_iter().map(RoomResponse::from).collect()))
}

/// POST /api/rooms - Add a room
async fn create_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomResponse>), RouteError> {
    require_admin(&headers)?;

    let room = state
        .ledger()
        .add_room(&req.name, req.capacity, req.occupants)
        .await
        .map_err(core_error)?;

    Ok((StatusCode::CREATED, Json(RoomResponse::from(room))))
}

/// GET /api/rooms/{id} - Get a single room
async fn get_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<RoomResponse>, RouteError> {
    require_session(&headers)?;

    let room = state.ledger().get_room(id).await.map_err(core_error)?;
    match room {
        Some(room) => Ok(Json(RoomResponse::from(room))),
        None => Err(not_found(format!("Room {} not found", id))),
    }
}

/// PATCH /api/rooms/{id} - Update capacity and/or occupants
async fn update_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRoomRequest>,
) -> Result<Json<RoomResponse>, RouteError> {
    require_admin(&headers)?;

    let room = state
        .ledger()
        .update_room(id, req.capacity, req.occupants)
        .await
        .map_err(core_error)?;

    Ok(Json(RoomResponse::from(room)))
}

/// DELETE /api/rooms/{id}
async fn delete_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, RouteError> {
    require_admin(&headers)?;

    let deleted = state.ledger().delete_room(id).await.map_err(core_error)?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(format!("Room {} not found", id)))
    }
}

/// GET /api/rooms/{id}/occupants - Approved requests living in this room
async fn list_occupants(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<OccupantResponse>>, RouteError> {
    require_admin(&headers)?;

    let room = state
        .ledger()
        .get_room(id)
        .await
        .map_err(core_error)?
        .ok_or_else(|| not_found(format!("Room {} not found", id)))?;

    let occupants = state
        .ledger()
        .approved_requests_for_room(&room.name)
        .await
        .map_err(core_error)?
        .into_iter()
        .map(|request| OccupantResponse {
            request_id: request.id,
            student_id: request.student_id,
            student_name: request.student_name,
            student_email: request.student_email,
        })
        .collect();

    Ok(Json(occupants))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/rooms", get(list_rooms).post(create_room))
        .route(
            "/api/rooms/{id}",
            get(get_room).patch(update_room).delete(delete_room),
        )
        .route("/api/rooms/{id}/occupants", get(list_occupants))
}
