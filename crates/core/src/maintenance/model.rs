//! Maintenance model definitions
//!
//! The `maintenanceRequests` and `ongoingMaintenance` collections use a
//! capitalized status vocabulary, unlike the lowercase one on room
//! requests. Both are preserved bit-exact at the storage boundary; the
//! distinction lives in the Rust types, not in runtime normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a submitted maintenance request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaintenanceStatus {
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "Approved")]
    Approved,
    #[serde(rename = "Rejected")]
    Rejected,
}

impl MaintenanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

/// Stage of an ongoing maintenance job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OngoingStatus {
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "Fixed")]
    Fixed,
    #[serde(rename = "Not Fixed")]
    NotFixed,
}

impl OngoingStatus {
    /// Terminal stages accept no further updates
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Fixed | Self::NotFixed)
    }
}

/// Fields collected from the maintenance request form
#[derive(Debug, Clone, Deserialize)]
pub struct NewMaintenanceRequest {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub index_number: String,
    pub phone: String,
    pub room: String,
    pub description: String,
}

/// A student's maintenance request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    pub id: Uuid,
    pub uid: String,
    pub name: String,
    pub email: String,
    pub index_number: String,
    pub phone: String,
    pub room: String,
    pub description: String,
    pub status: MaintenanceStatus,
    pub created_at: DateTime<Utc>,
}

impl MaintenanceRequest {
    pub fn new(form: NewMaintenanceRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            uid: form.uid,
            name: form.name,
            email: form.email,
            index_number: form.index_number,
            phone: form.phone,
            room: form.room,
            description: form.description,
            status: MaintenanceStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// An approved request promoted into the ongoing collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OngoingMaintenance {
    pub id: Uuid,
    /// The originating maintenance request
    pub request_id: Uuid,
    pub uid: String,
    pub name: String,
    pub room: String,
    pub description: String,
    pub status: OngoingStatus,
    pub approved_at: DateTime<Utc>,
}

impl OngoingMaintenance {
    pub fn from_request(request: &MaintenanceRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_id: request.id,
            uid: request.uid.clone(),
            name: request.name.clone(),
            room: request.room.clone(),
            description: request.description.clone(),
            status: OngoingStatus::Pending,
            approved_at: Utc::now(),
        }
    }
}
