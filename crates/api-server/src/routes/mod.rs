//! REST API routes

pub mod auth;
pub mod entry_exit;
pub mod health;
pub mod maintenance;
pub mod messages;
pub mod requests;
pub mod rooms;
pub mod users;

use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

use crate::session::{session_from_headers, Session};
use hostel_core::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type RouteError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn route_error(status: StatusCode, error: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

pub(crate) fn unauthorized(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::UNAUTHORIZED, error)
}

pub(crate) fn forbidden(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::FORBIDDEN, error)
}

pub(crate) fn bad_request(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::BAD_REQUEST, error)
}

pub(crate) fn not_found(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::NOT_FOUND, error)
}

/// Map a core error onto an HTTP status
pub(crate) fn core_error(err: Error) -> RouteError {
    let status = match &err {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::RoomNotFound(_)
        | Error::RequestNotFound(_)
        | Error::UserNotFound(_)
        | Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::RoomFull(_)
        | Error::DuplicateRequest(_)
        | Error::InvalidTransition(_)
        | Error::Conflict(_) => StatusCode::CONFLICT,
        Error::Io(_) | Error::Serialization(_) | Error::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    route_error(status, err.to_string())
}

/// Resolve the bearer session or fail with 401
pub(crate) fn require_session(headers: &HeaderMap) -> Result<Session, RouteError> {
    session_from_headers(headers).map_err(unauthorized)
}

/// Resolve the bearer session and require the admin role
pub(crate) fn require_admin(headers: &HeaderMap) -> Result<Session, RouteError> {
    let session = require_session(headers)?;
    if !session.is_admin() {
        return Err(forbidden("Admin role required"));
    }
    Ok(session)
}
