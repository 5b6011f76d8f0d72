//! File-based maintenance storage
//!
//! Both stages live behind one lock so approving a request and inserting
//! its ongoing copy cannot interleave with other writers.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{
    MaintenanceRequest, MaintenanceStatus, NewMaintenanceRequest, OngoingMaintenance,
    OngoingStatus,
};
use crate::{Error, Result};

struct MaintenanceState {
    requests: HashMap<Uuid, MaintenanceRequest>,
    ongoing: HashMap<Uuid, OngoingMaintenance>,
}

/// File-backed store over `maintenance.json` and `ongoing_maintenance.json`
pub struct FileMaintenanceStore {
    requests_path: PathBuf,
    ongoing_path: PathBuf,
    state: RwLock<MaintenanceState>,
}

fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.chars().all(|c| c.is_ascii_digit())
}

impl FileMaintenanceStore {
    pub async fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        let requests_path = data_dir.join("maintenance.json");
        let ongoing_path = data_dir.join("ongoing_maintenance.json");

        let requests: Vec<MaintenanceRequest> = if requests_path.exists() {
            serde_json::from_str(&tokio::fs::read_to_string(&requests_path).await?)?
        } else {
            Vec::new()
        };
        let ongoing: Vec<OngoingMaintenance> = if ongoing_path.exists() {
            serde_json::from_str(&tokio::fs::read_to_string(&ongoing_path).await?)?
        } else {
            Vec::new()
        };

        Ok(Self {
            requests_path,
            ongoing_path,
            state: RwLock::new(MaintenanceState {
                requests: requests.into_iter().map(|r| (r.id, r)).collect(),
                ongoing: ongoing.into_iter().map(|o| (o.id, o)).collect(),
            }),
        })
    }

    async fn persist(&self) -> Result<()> {
        let (requests, ongoing) = {
            let state = self.state.read().await;
            let requests: Vec<MaintenanceRequest> = state.requests.values().cloned().collect();
            let ongoing: Vec<OngoingMaintenance> = state.ongoing.values().cloned().collect();
            (requests, ongoing)
        };

        if let Some(parent) = self.requests_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.requests_path, serde_json::to_string_pretty(&requests)?).await?;
        tokio::fs::write(&self.ongoing_path, serde_json::to_string_pretty(&ongoing)?).await?;
        Ok(())
    }

    /// Submit a new maintenance request
    pub async fn submit(&self, form: NewMaintenanceRequest) -> Result<MaintenanceRequest> {
        if form.name.trim().is_empty()
            || form.email.trim().is_empty()
            || form.index_number.trim().is_empty()
        {
            return Err(Error::InvalidInput(
                "name, email and index number are required".to_string(),
            ));
        }
        if !is_valid_phone(&form.phone) {
            return Err(Error::InvalidInput(
                "phone number must be 10 digits".to_string(),
            ));
        }
        if form.room.trim().is_empty() || form.description.trim().is_empty() {
            return Err(Error::InvalidInput(
                "room and description are required".to_string(),
            ));
        }

        let request = MaintenanceRequest::new(form);
        {
            let mut state = self.state.write().await;
            state.requests.insert(request.id, request.clone());
        }
        self.persist().await?;
        Ok(request)
    }

    /// All requests, pending first, then newest first within a status
    pub async fn list(&self) -> Result<Vec<MaintenanceRequest>> {
        let state = self.state.read().await;
        let mut requests: Vec<MaintenanceRequest> = state.requests.values().cloned().collect();
        requests.sort_by(|a, b| {
            let a_pending = a.status == MaintenanceStatus::Pending;
            let b_pending = b.status == MaintenanceStatus::Pending;
            b_pending
                .cmp(&a_pending)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(requests)
    }

    /// Requests submitted by the given uid
    pub async fn list_for_uid(&self, uid: &str) -> Result<Vec<MaintenanceRequest>> {
        let state = self.state.read().await;
        let mut requests: Vec<MaintenanceRequest> = state
            .requests
            .values()
            .filter(|r| r.uid == uid)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    /// Approve a pending request and promote a copy into the ongoing stage
    pub async fn approve(&self, id: Uuid) -> Result<OngoingMaintenance> {
        let ongoing = {
            let mut guard = self.state.write().await;
            let state = &mut *guard;

            let request = state
                .requests
                .get_mut(&id)
                .ok_or_else(|| Error::NotFound(format!("maintenance request {}", id)))?;

            if request.status != MaintenanceStatus::Pending {
                return Err(Error::InvalidTransition(format!(
                    "cannot approve a maintenance request in state '{}'",
                    request.status.as_str()
                )));
            }

            request.status = MaintenanceStatus::Approved;
            let ongoing = OngoingMaintenance::from_request(request);
            state.ongoing.insert(ongoing.id, ongoing.clone());
            ongoing
        };
        self.persist().await?;
        Ok(ongoing)
    }

    /// Reject a pending request
    pub async fn reject(&self, id: Uuid) -> Result<MaintenanceRequest> {
        let rejected = {
            let mut state = self.state.write().await;
            let request = state
                .requests
                .get_mut(&id)
                .ok_or_else(|| Error::NotFound(format!("maintenance request {}", id)))?;

            if request.status == MaintenanceStatus::Approved {
                return Err(Error::InvalidTransition(
                    "approved maintenance requests cannot be rejected".to_string(),
                ));
            }

            request.status = MaintenanceStatus::Rejected;
            request.clone()
        };
        self.persist().await?;
        Ok(rejected)
    }

    /// Ongoing jobs, newest approval first; filtered by uid for students
    pub async fn list_ongoing(&self, uid: Option<&str>) -> Result<Vec<OngoingMaintenance>> {
        let state = self.state.read().await;
        let mut ongoing: Vec<OngoingMaintenance> = state
            .ongoing
            .values()
            .filter(|o| uid.map_or(true, |uid| o.uid == uid))
            .cloned()
            .collect();
        ongoing.sort_by(|a, b| b.approved_at.cmp(&a.approved_at));
        Ok(ongoing)
    }

    /// Mark an ongoing job fixed or not fixed
    pub async fn set_stage(&self, id: Uuid, stage: OngoingStatus) -> Result<OngoingMaintenance> {
        let updated = {
            let mut state = self.state.write().await;
            let ongoing = state
                .ongoing
                .get_mut(&id)
                .ok_or_else(|| Error::NotFound(format!("ongoing maintenance {}", id)))?;

            if ongoing.status.is_terminal() {
                return Err(Error::InvalidTransition(
                    "maintenance job is already closed".to_string(),
                ));
            }

            ongoing.status = stage;
            ongoing.clone()
        };
        self.persist().await?;
        Ok(updated)
    }
}
