//! Room request endpoints
//!
//! Students submit and watch their own requests; approval, rejection and
//! occupant removal are admin actions routed through the occupancy
//! ledger so room counts and request states move together.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hostel_core::ledger::LedgerStore;
use hostel_core::request::{RequestStatus, RoomRequest};

use super::{core_error, not_found, require_admin, require_session, RouteError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequestBody {
    room_id: Uuid,
}

#[derive(Debug, Deserialize, Default)]
struct RequestsQuery {
    #[serde(default)]
    status: Option<RequestStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestResponse {
    id: Uuid,
    uid: String,
    student_id: String,
    student_name: String,
    student_email: String,
    room_id: Uuid,
    room_name: String,
    status: RequestStatus,
    created_at: String,
}

impl From<RoomRequest> for RequestResponse {
    fn from(request: RoomRequest) -> Self {
        Self {
            id: request.id,
            uid: request.uid,
            student_id: request.student_id,
            student_name: request.student_name,
            student_email: request.student_email,
            room_id: request.room_id,
            room_name: request.room_name,
            status: request.status,
            created_at: request.created_at.to_rfc3339(),
        }
    }
}

/// GET /api/requests - Admin sees the ledger, students see their own
async fn list_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RequestsQuery>,
) -> Result<Json<Vec<RequestResponse>>, RouteError> {
    let session = require_session(&headers)?;

    let requests = if session.is_admin() {
        match query.status {
            Some(status) => state
                .ledger()
                .find_by_status(status)
                .await
                .map_err(core_error)?,
            None => state.ledger().list_requests().await.map_err(core_error)?,
        }
    } else {
        state
            .ledger()
            .requests_for_uid(&session.uid)
            .await
            .map_err(core_error)?
    };

    Ok(Json(
        requests.into_iter().map(RequestResponse::from).collect(),
    ))
}

/// POST /api/requests - Submit a room application for the caller
async fn submit_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SubmitRequestBody>,
) -> Result<(StatusCode, Json<RequestResponse>), RouteError> {
    let session = require_session(&headers)?;

    let profile = state
        .users()
        .find_by_uid(&session.uid)
        .await
        .map_err(core_error)?
        .ok_or_else(|| not_found(format!("No profile for uid {}", session.uid)))?;

    let request = state
        .ledger()
        .submit_request(&profile, body.room_id)
        .await
        .map_err(core_error)?;

    Ok((StatusCode::CREATED, Json(RequestResponse::from(request))))
}

/// POST /api/requests/{id}/approve
async fn approve_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestResponse>, RouteError> {
    require_admin(&headers)?;

    let request = state
        .ledger()
        .get_request(id)
        .await
        .map_err(core_error)?
        .ok_or_else(|| not_found(format!("Request {} not found", id)))?;

    let approved = state
        .ledger()
        .approve(request.id, request.room_id)
        .await
        .map_err(core_error)?;

    Ok(Json(RequestResponse::from(approved)))
}

/// POST /api/requests/{id}/reject
async fn reject_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestResponse>, RouteError> {
    require_admin(&headers)?;

    let rejected = state.ledger().reject(id).await.map_err(core_error)?;
    Ok(Json(RequestResponse::from(rejected)))
}

/// POST /api/requests/{id}/remove - Release an approved occupant
async fn remove_occupant(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestResponse>, RouteError> {
    require_admin(&headers)?;

    let request = state
        .ledger()
        .get_request(id)
        .await
        .map_err(core_error)?
        .ok_or_else(|| not_found(format!("Request {} not found", id)))?;

    let removed = state
        .ledger()
        .remove_occupant(request.id, request.room_id)
        .await
        .map_err(core_error)?;

    Ok(Json(RequestResponse::from(removed)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/requests", get(list_requests).post(submit_request))
        .route("/api/requests/{id}/approve", post(approve_request))
        .route("/api/requests/{id}/reject", post(reject_request))
        .route("/api/requests/{id}/remove", post(remove_occupant))
}
