//! User profile model definitions

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role attached to a registered user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Student,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Student => "student",
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Student
    }
}

/// Fields collected at registration time
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub index_number: String,
    #[serde(default)]
    pub other_detail: String,
}

/// A registered user's profile
///
/// `uid` is the identity provider's opaque key and is the only session
/// identifier the application carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub uid: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub index_number: String,
    #[serde(default)]
    pub other_detail: String,
    #[serde(default)]
    pub role: UserRole,
}

impl UserProfile {
    pub fn new(new_user: NewUser, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            uid: new_user.uid,
            name: new_user.name,
            email: new_user.email,
            phone: new_user.phone,
            index_number: new_user.index_number,
            other_detail: new_user.other_detail,
            role,
        }
    }

    /// Whether the profile carries everything a room request denormalizes
    pub fn is_complete_for_request(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.index_number.trim().is_empty()
    }
}
