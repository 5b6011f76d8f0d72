//! Room request model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserProfile;

/// Status of a room request
///
/// The serialized strings match the stored vocabulary of the `requests`
/// collection exactly, including the space in `"not approved"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "approved")]
    Approved,
    #[serde(rename = "not approved")]
    NotApproved,
}

impl Default for RequestStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::NotApproved => "not approved",
        }
    }

    /// Whether the request still counts against the one-active-request-per-user rule
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

/// A student's application for a room
///
/// Student fields are denormalized copies of the profile at submission
/// time; later profile edits do not rewrite past requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    pub id: Uuid,
    pub uid: String,
    pub student_id: String,
    pub student_name: String,
    pub student_email: String,
    pub room_id: Uuid,
    pub room_name: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl RoomRequest {
    /// Create a new pending request, denormalizing the student profile
    pub fn new(profile: &UserProfile, room_id: Uuid, room_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            uid: profile.uid.clone(),
            student_id: profile.index_number.clone(),
            student_name: profile.name.clone(),
            student_email: profile.email.clone(),
            room_id,
            room_name: room_name.into(),
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{NewUser, UserRole};

    fn sample_profile() -> UserProfile {
        UserProfile::new(
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
    }

    #[test]
    fn test_status_serializes_to_stored_vocabulary() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&RequestStatus::Approved).unwrap(),
            "\"approved\""
        );
        assert_eq!(
            serde_json::to_string(&RequestStatus::NotApproved).unwrap(),
            "\"not approved\""
        );
    }

    #[test]
    fn test_new_request_denormalizes_profile() {
        let profile = sample_profile();
        let room_id = Uuid::new_v4();
        let request = RoomRequest::new(&profile, room_id, "A-101");

        assert_eq!(request.uid, "u1");
        assert_eq!(request.student_id, "IT2021-044");
        assert_eq!(request.student_name, "Asha Perera");
        assert_eq!(request.student_email, "asha@example.com");
        assert_eq!(request.room_id, room_id);
        assert_eq!(request.room_name, "A-101");
        assert_eq!(request.status, RequestStatus::Pending);
    }

    #[test]
    fn test_request_serializes_with_camel_case_fields() {
        let request = RoomRequest::new(&sample_profile(), Uuid::new_v4(), "A-101");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["studentId"], "IT2021-044");
        assert_eq!(value["studentName"], "Asha Perera");
        assert_eq!(value["roomName"], "A-101");
        assert!(value.get("roomId").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("student_id").is_none());
    }

    #[test]
    fn test_active_statuses() {
        assert!(RequestStatus::Pending.is_active());
        assert!(RequestStatus::Approved.is_active());
        assert!(!RequestStatus::NotApproved.is_active());
    }
}
