//! Session endpoints
//!
//! The client authenticates against the external identity provider and
//! presents the resulting uid here. Three outcomes: a registered uid gets
//! a session token, an unknown uid is told to register, a blank uid is a
//! validation error.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hostel_core::user::{NewUser, UserRole};

use super::users::ProfileResponse;
use super::{bad_request, core_error, require_session, RouteError};
use crate::session::{issue_session_token, visible_routes, ClientRoute};
use crate::state::AppState;

const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    uid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    uid: String,
    name: String,
    email: String,
    phone: String,
    index_number: String,
    #[serde(default)]
    other_detail: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    registered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<ProfileResponse>,
    /// Navigation the client should render for this session
    routes: &'static [ClientRoute],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MeResponse {
    uid: String,
    role: String,
    profile: ProfileResponse,
    routes: &'static [ClientRoute],
}

fn format_expiry(exp: usize) -> String {
    DateTime::<Utc>::from_timestamp(exp as i64, 0)
        .map(|value| value.to_rfc3339())
        .unwrap_or_else(|| Utc::now().to_rfc3339())
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, RouteError> {
    let uid = req.uid.trim();
    if uid.is_empty() {
        return Err(bad_request("uid is required"));
    }

    let profile = state.users().find_by_uid(uid).await.map_err(core_error)?;

    match profile {
        Some(profile) => {
            let (token, exp) = issue_session_token(uid, profile.role, SESSION_TTL_HOURS)
                .map_err(|err| super::route_error(StatusCode::INTERNAL_SERVER_ERROR, err))?;
            Ok(Json(LoginResponse {
                registered: true,
                token: Some(token),
                expires_at: Some(format_expiry(exp)),
                routes: visible_routes(Some(profile.role), true),
                profile: Some(ProfileResponse::from(profile)),
            }))
        }
        // Authenticated with the provider but not yet registered here
        None => Ok(Json(LoginResponse {
            registered: false,
            token: None,
            expires_at: None,
            profile: None,
            routes: visible_routes(None, false),
        })),
    }
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), RouteError> {
    let role = if state.is_seed_admin(req.uid.trim()) {
        UserRole::Admin
    } else {
        UserRole::Student
    };

    let profile = state
        .users()
        .register(
            NewUser {
                uid: req.uid.trim().to_string(),
                name: req.name,
                email: req.email,
                phone: req.phone,
                index_number: req.index_number,
                other_detail: req.other_detail,
            },
            role,
        )
        .await
        .map_err(core_error)?;

    let (token, exp) = issue_session_token(&profile.uid, profile.role, SESSION_TTL_HOURS)
        .map_err(|err| super::route_error(StatusCode::INTERNAL_SERVER_ERROR, err))?;

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            registered: true,
            token: Some(token),
            expires_at: Some(format_expiry(exp)),
            routes: visible_routes(Some(profile.role), true),
            profile: Some(ProfileResponse::from(profile)),
        }),
    ))
}

/// GET /api/auth/me
async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, RouteError> {
    let session = require_session(&headers)?;

    let profile = state
        .users()
        .find_by_uid(&session.uid)
        .await
        .map_err(core_error)?
        .ok_or_else(|| super::not_found(format!("No profile for uid {}", session.uid)))?;

    Ok(Json(MeResponse {
        uid: session.uid,
        role: session.role.as_str().to_string(),
        routes: visible_routes(Some(session.role), true),
        profile: ProfileResponse::from(profile),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/me", get(me))
}
