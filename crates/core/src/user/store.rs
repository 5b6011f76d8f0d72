//! File-based user storage
//!
//! Stores registered profiles as JSON in a file on disk, keyed by the
//! identity provider uid.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::RwLock;

use super::model::{NewUser, UserProfile, UserRole};
use crate::{Error, Result};

/// File-based user store using JSON
pub struct FileUserStore {
    path: PathBuf,
    cache: RwLock<HashMap<String, UserProfile>>,
}

impl FileUserStore {
    /// Create a new FileUserStore
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            let users: Vec<UserProfile> = serde_json::from_str(&content)?;
            users.into_iter().map(|u| (u.uid.clone(), u)).collect()
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    async fn persist(&self) -> Result<()> {
        let cache = self.cache.read().await;
        let users: Vec<&UserProfile> = cache.values().collect();
        let content = serde_json::to_string_pretty(&users)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    /// Register a new user, rejecting a uid that already has a profile
    pub async fn register(&self, new_user: NewUser, role: UserRole) -> Result<UserProfile> {
        if new_user.uid.trim().is_empty() {
            return Err(Error::InvalidInput("uid cannot be empty".to_string()));
        }
        if new_user.name.trim().is_empty() || new_user.email.trim().is_empty() {
            return Err(Error::InvalidInput(
                "name and email are required".to_string(),
            ));
        }

        let profile = UserProfile::new(new_user, role);
        {
            let mut cache = self.cache.write().await;
            if cache.contains_key(&profile.uid) {
                return Err(Error::Conflict(format!(
                    "User with uid {} is already registered",
                    profile.uid
                )));
            }
            cache.insert(profile.uid.clone(), profile.clone());
        }
        self.persist().await?;
        Ok(profile)
    }

    /// Look up a profile by identity provider uid
    pub async fn find_by_uid(&self, uid: &str) -> Result<Option<UserProfile>> {
        let cache = self.cache.read().await;
        Ok(cache.get(uid).cloned())
    }

    /// All registered users, sorted by index number for stable rosters
    pub async fn list(&self) -> Result<Vec<UserProfile>> {
        let cache = self.cache.read().await;
        let mut users: Vec<UserProfile> = cache.values().cloned().collect();
        users.sort_by(|a, b| a.index_number.cmp(&b.index_number));
        Ok(users)
    }

    /// Self-service profile edit; the uid and role are not editable here
    pub async fn update_profile(
        &self,
        uid: &str,
        name: Option<String>,
        phone: Option<String>,
        other_detail: Option<String>,
    ) -> Result<UserProfile> {
        let updated = {
            let mut cache = self.cache.write().await;
            let profile = cache
                .get_mut(uid)
                .ok_or_else(|| Error::UserNotFound(uid.to_string()))?;

            if let Some(name) = name {
                if name.trim().is_empty() {
                    return Err(Error::InvalidInput("name cannot be empty".to_string()));
                }
                profile.name = name;
            }
            if let Some(phone) = phone {
                profile.phone = phone;
            }
            if let Some(other_detail) = other_detail {
                profile.other_detail = other_detail;
            }
            profile.clone()
        };
        self.persist().await?;
        Ok(updated)
    }
}
