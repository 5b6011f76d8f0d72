//! Student roster and profile endpoints

use axum::{
    extract::State,
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hostel_core::user::{UserProfile, UserRole};

use super::{core_error, not_found, require_admin, require_session, RouteError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileResponse {
    pub id: Uuid,
    pub uid: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub index_number: String,
    pub other_detail: String,
    pub role: String,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            uid: profile.uid,
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
            index_number: profile.index_number,
            other_detail: profile.other_detail,
            role: profile.role.as_str().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    other_detail: Option<String>,
}

/// GET /api/students - Admin roster of registered students
async fn list_students(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ProfileResponse>>, RouteError> {
    require_admin(&headers)?;

    let students = state
        .users()
        .list()
        .await
        .map_err(core_error)?
        .into_iter()
        .filter(|profile| profile.role == UserRole::Student)
        .map(ProfileResponse::from)
        .collect();

    Ok(Json(students))
}

/// GET /api/profile - The caller's own profile
async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, RouteError> {
    let session = require_session(&headers)?;

    let profile = state
        .users()
        .find_by_uid(&session.uid)
        .await
        .map_err(core_error)?
        .ok_or_else(|| not_found(format!("No profile for uid {}", session.uid)))?;

    Ok(Json(ProfileResponse::from(profile)))
}

/// PATCH /api/profile - Self-service profile edit
async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, RouteError> {
    let session = require_session(&headers)?;

    let updated = state
        .users()
        .update_profile(&session.uid, req.name, req.phone, req.other_detail)
        .await
        .map_err(core_error)?;

    Ok(Json(ProfileResponse::from(updated)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/students", get(list_students))
        .route("/api/profile", get(get_profile).patch(update_profile))
}
