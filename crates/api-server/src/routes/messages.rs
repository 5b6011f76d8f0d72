//! Messaging endpoints
//!
//! Point-to-point notices between wardens and students. The sender is
//! always the session holder, never taken from the request body.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hostel_core::message::Message;

use super::{core_error, forbidden, require_session, RouteError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct SendMessageBody {
    receiver: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    body: String,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    id: Uuid,
    sender: String,
    receiver: String,
    subject: String,
    body: String,
    read: bool,
    timestamp: String,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            sender: message.sender,
            receiver: message.receiver,
            subject: message.subject,
            body: message.body,
            read: message.read,
            timestamp: message.timestamp.to_rfc3339(),
        }
    }
}

/// POST /api/messages
async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SendMessageBody>,
) -> Result<(StatusCode, Json<MessageResponse>), RouteError> {
    let session = require_session(&headers)?;

    let message = state
        .messages()
        .send(Message::new(
            &session.uid,
            &body.receiver,
            &body.subject,
            &body.body,
        ))
        .await
        .map_err(core_error)?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}

/// GET /api/messages - The caller's inbox, newest first
async fn inbox(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<MessageResponse>>, RouteError> {
    let session = require_session(&headers)?;

    let messages = state
        .messages()
        .inbox(&session.uid)
        .await
        .map_err(core_error)?;

    Ok(Json(
        messages.into_iter().map(MessageResponse::from).collect(),
    ))
}

/// POST /api/messages/{id}/read - Only the receiver may mark a message read
async fn mark_read(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, RouteError> {
    let session = require_session(&headers)?;

    let owns_message = state
        .messages()
        .inbox(&session.uid)
        .await
        .map_err(core_error)?
        .iter()
        .any(|m| m.id == id);
    if !owns_message && !session.is_admin() {
        return Err(forbidden("Message does not belong to this inbox"));
    }

    let updated = state.messages().mark_read(id).await.map_err(core_error)?;
    Ok(Json(MessageResponse::from(updated)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/messages", get(inbox).post(send_message))
        .route("/api/messages/{id}/read", post(mark_read))
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

    fn token(uid: &str, role: UserRole) -> String {
        issue_session_token(uid, role, 1).unwrap().0
    }

    async fn send(app: &Router, token: &str, receiver: &str, subject: &str) -> Value {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/messages")
                    .header("Authorization", format!("Bearer {}", token))
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        json!({ "receiver": receiver, "subject": subject, "body": "..." })
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn inbox_is_scoped_to_the_session() {
        let (state, _tmp) = build_state().await;
        let app = super::router().with_state(state);
        let admin = token("warden", UserRole::Admin);

        send(&app, &admin, "u1", "Curfew").await;
        send(&app, &admin, "u2", "Inspection").await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/messages")
                    .header(
                        "Authorization",
                        format!("Bearer {}", token("u1", UserRole::Student)),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: Value = serde_json::from_slice(&body).unwrap();
        let inbox = payload.as_array().unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0]["subject"], "Curfew");
        assert_eq!(inbox[0]["sender"], "warden");
        assert_eq!(inbox[0]["read"], false);
    }

    #[tokio::test]
    async fn only_the_receiver_marks_read() {
        let (state, _tmp) = build_state().await;
        let app = super::router().with_state(state);
        let admin = token("warden", UserRole::Admin);

        let message = send(&app, &admin, "u1", "Curfew").await;
        let id = message["id"].as_str().unwrap();

        let mark = |uid: &str, role: UserRole| {
            Request::builder()
                .method("POST")
                .uri(format!("/api/messages/{}/read", id))
                .header("Authorization", format!("Bearer {}", token(uid, role)))
                .body(Body::empty())
                .unwrap()
        };

        let response = app
            .clone()
            .oneshot(mark("u2", UserRole::Student))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app.oneshot(mark("u1", UserRole::Student)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload["read"], true);
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let (state, _tmp) = build_state().await;
        let app = super::router().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/messages")
                    .header(
                        "Authorization",
                        format!("Bearer {}", token("warden", UserRole::Admin)),
                    )
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        json!({ "receiver": "u1", "subject": "", "body": "" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
