//! Maintenance endpoints
//!
//! Two-stage lifecycle: a submitted request is approved into the ongoing
//! collection, where wardens track it to Fixed or Not Fixed.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hostel_core::maintenance::{
    MaintenanceRequest, MaintenanceStatus, NewMaintenanceRequest, OngoingMaintenance,
    OngoingStatus,
};

use super::{core_error, require_admin, require_session, RouteError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitMaintenanceBody {
    name: String,
    email: String,
    index_number: String,
    phone: String,
    room: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct SetStageBody {
    status: OngoingStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MaintenanceResponse {
    id: Uuid,
    uid: String,
    name: String,
    email: String,
    index_number: String,
    phone: String,
    room: String,
    description: String,
    status: MaintenanceStatus,
    created_at: String,
}

impl From<MaintenanceRequest> for MaintenanceResponse {
    fn from(request: MaintenanceRequest) -> Self {
        Self {
            id: request.id,
            uid: request.uid,
            name: request.name,
            email: request.email,
            index_number: request.index_number,
            phone: request.phone,
            room: request.room,
            description: request.description,
            status: request.status,
            created_at: request.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OngoingResponse {
    id: Uuid,
    request_id: Uuid,
    uid: String,
    name: String,
    room: String,
    description: String,
    status: OngoingStatus,
    approved_at: String,
}

impl From<OngoingMaintenance> for OngoingResponse {
    fn from(job: OngoingMaintenance) -> Self {
        Self {
            id: job.id,
            request_id: job.request_id,
            uid: job.uid,
            name: job.name,
            room: job.room,
            description: job.description,
            status: job.status,
            approved_at: job.approved_at.to_rfc3339(),
        }
    }
}

/// POST /api/maintenance - Submit a repair request for the caller
async fn submit_maintenance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SubmitMaintenanceBody>,
) -> Result<(StatusCode, Json<MaintenanceResponse>), RouteError> {
    let session = require_session(&headers)?;

    let submitted = state
        .maintenance()
        .submit(NewMaintenanceRequest {
            uid: session.uid,
            name: body.name,
            email: body.email,
            index_number: body.index_number,
            phone: body.phone,
            room: body.room,
            description: body.description,
        })
        .await
        .map_err(core_error)?;

    Ok((
        StatusCode::CREATED,
        Json(MaintenanceResponse::from(submitted)),
    ))
}

/// GET /api/maintenance - Admin sees everything, students their own
async fn list_maintenance(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<MaintenanceResponse>>, RouteError> {
    let session = require_session(&headers)?;

    let requests = if session.is_admin() {
        state.maintenance().list().await.map_err(core_error)?
    } else {
        state
            .maintenance()
            .list_for_uid(&session.uid)
            .await
            .map_err(core_error)?
    };

    Ok(Json(
        requests.into_iter().map(MaintenanceResponse::from).collect(),
    ))
}

/// POST /api/maintenance/{id}/approve - Promote into the ongoing collection
async fn approve_maintenance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<OngoingResponse>, RouteError> {
    require_admin(&headers)?;

    let ongoing = state.maintenance().approve(id).await.map_err(core_error)?;
    Ok(Json(OngoingResponse::from(ongoing)))
}

/// POST /api/maintenance/{id}/reject
async fn reject_maintenance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<MaintenanceResponse>, RouteError> {
    require_admin(&headers)?;

    let rejected = state.maintenance().reject(id).await.map_err(core_error)?;
    Ok(Json(MaintenanceResponse::from(rejected)))
}

/// GET /api/maintenance/ongoing
async fn list_ongoing(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<OngoingResponse>>, RouteError> {
    let session = require_session(&headers)?;

    let uid = if session.is_admin() {
        None
    } else {
        Some(session.uid.as_str())
    };
    let jobs = state
        .maintenance()
        .list_ongoing(uid)
        .await
        .map_err(core_error)?;

    Ok(Json(jobs.into_iter().map(OngoingResponse::from).collect()))
}

/// POST /api/maintenance/ongoing/{id}/status - Move a job between stages
async fn set_ongoing_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<SetStageBody>,
) -> Result<Json<OngoingResponse>, RouteError> {
    require_admin(&headers)?;

    let updated = state
        .maintenance()
        .set_stage(id, body.status)
        .await
        .map_err(core_error)?;

    Ok(Json(OngoingResponse::from(updated)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/maintenance",
            get(list_maintenance).post(submit_maintenance),
        )
        .route("/api/maintenance/{id}/approve", post(approve_maintenance))
        .route("/api/maintenance/{id}/reject", post(reject_maintenance))
        .route("/api/maintenance/ongoing", get(list_ongoing))
        .route(
            "/api/maintenance/ongoing/{id}/status",
            post(set_ongoing_status),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use hostel_core::user::UserRole;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::session::issue_session_token;

    async fn build_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let state = AppState::new(temp_dir.path().to_path_buf(), Vec::new())
            .await
            .unwrap();
        (state, temp_dir)
    }

    fn student_token(uid: &str) -> String {
        issue_session_token(uid, UserRole::Student, 1).unwrap().0
    }

    fn admin_token() -> String {
        issue_session_token("warden", UserRole::Admin, 1).unwrap().0
    }

    fn submit_body() -> String {
        json!({
            "name": "Asha Perera",
            "email": "asha@example.com",
            "indexNumber": "IT2021-044",
            "phone": "0712345678",
            "room": "A-101",
            "description": "Broken window latch"
        })
        .to_string()
    }

    async fn submit(app: &Router, token: &str) -> Value {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/maintenance")
                    .header("Authorization", format!("Bearer {}", token))
                    .header("Content-Type", "application/json")
                    .body(Body::from(submit_body()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn approve_promotes_into_ongoing() {
        let (state, _tmp) = build_state().await;
        let app = super::router().with_state(state);

        let payload = submit(&app, &student_token("u1")).await;
        assert_eq!(payload["status"], "Pending");
        let id = payload["id"].as_str().unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/maintenance/{}/approve", id))
                    .header("Authorization", format!("Bearer {}", admin_token()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let ongoing: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(ongoing["requestId"].as_str().unwrap(), id);
        assert_eq!(ongoing["status"], "Pending");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/maintenance/ongoing")
                    .header("Authorization", format!("Bearer {}", admin_token()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let jobs: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(jobs.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn terminal_stage_rejects_further_updates() {
        let (state, _tmp) = build_state().await;
        let app = super::router().with_state(state);

        let payload = submit(&app, &student_token("u1")).await;
        let id = payload["id"].as_str().unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/maintenance/{}/approve", id))
                    .header("Authorization", format!("Bearer {}", admin_token()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let ongoing: Value = serde_json::from_slice(&body).unwrap();
        let ongoing_id = ongoing["id"].as_str().unwrap();

        let set_status = |status: &str| {
            Request::builder()
                .method("POST")
                .uri(format!("/api/maintenance/ongoing/{}/status", ongoing_id))
                .header("Authorization", format!("Bearer {}", admin_token()))
                .header("Content-Type", "application/json")
                .body(Body::from(json!({ "status": status }).to_string()))
                .unwrap()
        };

        let response = app.clone().oneshot(set_status("Fixed")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(set_status("Pending")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn students_only_see_their_own_submissions() {
        let (state, _tmp) = build_state().await;
        let app = super::router().with_state(state);

        submit(&app, &student_token("u1")).await;
        submit(&app, &student_token("u2")).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/maintenance")
                    .header("Authorization", format!("Bearer {}", student_token("u1")))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.as_array().unwrap().len(), 1);
        assert_eq!(payload[0]["uid"], "u1");
    }

    #[tokio::test]
    async fn students_cannot_approve() {
        let (state, _tmp) = build_state().await;
        let app = super::router().with_state(state);

        let payload = submit(&app, &student_token("u1")).await;
        let id = payload["id"].as_str().unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/maintenance/{}/approve", id))
                    .header("Authorization", format!("Bearer {}", student_token("u1")))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
