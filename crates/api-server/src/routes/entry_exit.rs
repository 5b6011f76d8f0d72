//! Entry/exit log endpoints
//!
//! Gate events are recorded by the desk terminal (an admin session) with
//! the presented credential hashed before it touches disk.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hostel_core::entry_exit::{EntryExitLog, EntryKind};

use super::{bad_request, core_error, not_found, require_admin, RouteError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordEntryBody {
    credential: String,
    uid: String,
    kind: EntryKind,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryExitResponse {
    id: Uuid,
    uid: String,
    name: String,
    index_number: String,
    phone: String,
    email: String,
    kind: EntryKind,
    timestamp: String,
}

impl From<EntryExitLog> for EntryExitResponse {
    fn from(log: EntryExitLog) -> Self {
        Self {
            id: log.id,
            uid: log.uid,
            name: log.name,
            index_number: log.index_number,
            phone: log.phone,
            email: log.email,
            kind: log.kind,
            timestamp: log.timestamp.to_rfc3339(),
        }
    }
}

/// POST /api/entry-exit - Record a gate event for a registered student
async fn record_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RecordEntryBody>,
) -> Result<(StatusCode, Json<EntryExitResponse>), RouteError> {
    require_admin(&headers)?;

    if body.credential.trim().is_empty() {
        return Err(bad_request("Credential must not be empty"));
    }

    let profile = state
        .users()
        .find_by_uid(&body.uid)
        .await
        .map_err(core_error)?
        .ok_or_else(|| not_found(format!("No profile for uid {}", body.uid)))?;

    let log = state
        .entry_exit()
        .record(EntryExitLog::new(&body.credential, &profile, body.kind))
        .await
        .map_err(core_error)?;

    Ok((StatusCode::CREATED, Json(EntryExitResponse::from(log))))
}

/// GET /api/entry-exit - Full log, newest first
async fn list_events(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<EntryExitResponse>>, RouteError> {
    require_admin(&headers)?;

    let logs = state.entry_exit().list().await;
    Ok(Json(logs.into_iter().map(EntryExitResponse::from).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/entry-exit", get(list_events).post(record_event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use hostel_core::user::{NewUser, UserRole};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::session::issue_session_token;

    async fn build_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let state = AppState::new(temp_dir.path().to_path_buf(), Vec::new())
            .await
            .unwrap();
        state
            .users()
            .register(
                NewUser {
                    uid: "u1".into(),
                    name: "Asha Perera".into(),
                    email: "asha@example.com".into(),
                    phone: "0712345678".into(),
                    index_number: "IT2021-044".into(),
                    other_detail: String::new(),
                },
                UserRole::Student,
            )
            .await
            .unwrap();
        (state, temp_dir)
    }

    fn admin_token() -> String {
        issue_session_token("warden", UserRole::Admin, 1).unwrap().0
    }

    fn record(token: &str, uid: &str, kind: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/entry-exit")
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .body(Body::from(
                json!({ "credential": "finger-001", "uid": uid, "kind": kind }).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn record_and_list_events() {
        let (state, _tmp) = build_state().await;
        let app = super::router().with_state(state);

        let response = app
            .clone()
            .oneshot(record(&admin_token(), "u1", "Entry"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload["name"], "Asha Perera");
        assert_eq!(payload["kind"], "Entry");

        let response = app
            .clone()
            .oneshot(record(&admin_token(), "u1", "Short Exit"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/entry-exit")
                    .header("Authorization", format!("Bearer {}", admin_token()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: Value = serde_json::from_slice(&body).unwrap();
        let events = payload.as_array().unwrap();
        assert_eq!(events.len(), 2);
        // Newest first
        assert_eq!(events[0]["kind"], "Short Exit");
    }

    #[tokio::test]
    async fn unknown_uid_is_not_found() {
        let (state, _tmp) = build_state().await;
        let app = super::router().with_state(state);

        let response = app
            .oneshot(record(&admin_token(), "nobody", "Entry"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn students_are_forbidden() {
        let (state, _tmp) = build_state().await;
        let app = super::router().with_state(state);
        let token = issue_session_token("u1", UserRole::Student, 1).unwrap().0;

        let response = app
            .clone()
            .oneshot(record(&token, "u1", "Entry"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/entry-exit")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
