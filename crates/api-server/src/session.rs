//! Session tokens and role-based gating
//!
//! The identity provider is external and hands the client an opaque uid;
//! login exchanges that uid for a signed session token so every workflow
//! call carries an explicit session instead of reading ambient storage.

use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use hostel_core::user::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

/// A resolved session, passed explicitly into route handlers
#[derive(Debug, Clone)]
pub struct Session {
    pub uid: String,
    pub role: UserRole,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

fn jwt_secret() -> String {
    std::env::var("HOSTEL_JWT_SECRET").unwrap_or_else(|_| "dev-jwt-secret-change-me".to_string())
}

pub fn issue_session_token(uid: &str, role: UserRole, ttl_hours: i64) -> Result<(String, usize), String> {
    let exp = (Utc::now() + Duration::hours(ttl_hours)).timestamp() as usize;
    let claims = SessionClaims {
        sub: uid.to_string(),
        role: role.as_str().to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_bytes()),
    )
    .map(|token| (token, exp))
    .map_err(|err| format!("Failed to sign session token: {}", err))
}

pub fn verify_session_token(token: &str) -> Result<Session, String> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let claims = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret().as_bytes()),
        &validation,
    )
    .map(|decoded| decoded.claims)
    .map_err(|err| format!("Invalid session token: {}", err))?;

    let role = match claims.role.as_str() {
        "admin" => UserRole::Admin,
        "student" => UserRole::Student,
        other => return Err(format!("Unknown role '{}'", other)),
    };

    Ok(Session {
        uid: claims.sub,
        role,
    })
}

/// Resolve the bearer token on a request
pub fn session_from_headers(headers: &HeaderMap) -> Result<Session, String> {
    let header = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| "Authorization header is not a bearer token".to_string())?;

    verify_session_token(token.trim())
}

/// Client-visible route set, gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientRoute {
    Login,
    Register,
    Dashboard,
    RoomRequest,
    ApproveRequests,
    ManageRooms,
    Students,
    EntryExit,
    Maintenance,
    Messages,
    Profile,
}

/// Which routes a client may see, as a pure function of the session state
///
/// `role` is `None` for an unauthenticated client; `registered` is false
/// for an authenticated uid without a stored profile.
pub fn visible_routes(role: Option<UserRole>, registered: bool) -> &'static [ClientRoute] {
    match (role, registered) {
        (None, _) => &[ClientRoute::Login],
        (Some(_), false) => &[ClientRoute::Register],
        (Some(UserRole::Admin), true) => &[
            ClientRoute::Dashboard,
            ClientRoute::ApproveRequests,
            ClientRoute::ManageRooms,
            ClientRoute::Students,
            ClientRoute::EntryExit,
            ClientRoute::Maintenance,
            ClientRoute::Messages,
            ClientRoute::Profile,
        ],
        (Some(UserRole::Student), true) => &[
            ClientRoute::Dashboard,
            ClientRoute::RoomRequest,
            ClientRoute::Maintenance,
            ClientRoute::Messages,
            ClientRoute::Profile,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let (token, _exp) = issue_session_token("u1", UserRole::Student, 1).unwrap();
        let session = verify_session_token(&token).unwrap();
        assert_eq!(session.uid, "u1");
        assert_eq!(session.role, UserRole::Student);
        assert!(!session.is_admin());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify_session_token("not-a-token").is_err());
    }

    #[test]
    fn test_header_resolution() {
        let (token, _exp) = issue_session_token("u1", UserRole::Admin, 1).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", format!("Bearer {}", token).parse().unwrap());
        let session = session_from_headers(&headers).unwrap();
        assert!(session.is_admin());

        let mut bad = HeaderMap::new();
        bad.insert("Authorization", token.parse().unwrap());
        assert!(session_from_headers(&bad).is_err());

        assert!(session_from_headers(&HeaderMap::new()).is_err());
    }

    #[test]
    fn test_unauthenticated_sees_only_login() {
        assert_eq!(visible_routes(None, false), &[ClientRoute::Login]);
        // A stale registration flag without a role still means login
        assert_eq!(visible_routes(None, true), &[ClientRoute::Login]);
    }

    #[test]
    fn test_unregistered_sees_only_registration() {
        assert_eq!(
            visible_routes(Some(UserRole::Student), false),
            &[ClientRoute::Register]
        );
    }

    #[test]
    fn test_role_gated_route_sets() {
        let admin = visible_routes(Some(UserRole::Admin), true);
        assert!(admin.contains(&ClientRoute::ApproveRequests));
        assert!(admin.contains(&ClientRoute::Students));

        let student = visible_routes(Some(UserRole::Student), true);
        assert!(student.contains(&ClientRoute::RoomRequest));
        assert!(!student.contains(&ClientRoute::ApproveRequests));
        assert!(!student.contains(&ClientRoute::ManageRooms));
    }
}
