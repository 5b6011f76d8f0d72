//! Entry/exit log model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::user::UserProfile;

/// Kind of gate event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "Entry")]
    Entry,
    #[serde(rename = "Short Exit")]
    ShortExit,
    #[serde(rename = "Long Exit")]
    LongExit,
}

/// Hash the credential presented at the gate (fingerprint reader uid)
pub fn hash_credential(credential: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(credential.as_bytes());
    hex::encode(hasher.finalize())
}

/// One gate event; written once, never mutated
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryExitLog {
    pub id: Uuid,
    pub credential_hash: String,
    pub uid: String,
    pub name: String,
    pub index_number: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub other_detail: String,
    pub kind: EntryKind,
    pub timestamp: DateTime<Utc>,
}

impl EntryExitLog {
    pub fn new(credential: &str, profile: &UserProfile, kind: EntryKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            credential_hash: hash_credential(credential),
            uid: profile.uid.clone(),
            name: profile.name.clone(),
            index_number: profile.index_number.clone(),
            phone: profile.phone.clone(),
            email: profile.email.clone(),
            other_detail: profile.other_detail.clone(),
            kind,
            timestamp: Utc::now(),
        }
    }
}
