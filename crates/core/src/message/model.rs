use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An internal message between two users
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    /// Sender uid, or "admin"
    pub sender: String,
    pub receiver: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub read: bool,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: sender.into(),
            receiver: receiver.into(),
            subject: subject.into(),
            body: body.into(),
            read: false,
            timestamp: Utc::now(),
        }
    }
}
