//! File-based ledger storage implementation
//!
//! Rooms and requests live behind a single lock so every workflow
//! operation checks its preconditions and issues its writes atomically.
//! Capacity checks and status transitions can therefore never interleave,
//! which is what keeps `0 <= occupants <= capacity` true under concurrent
//! approvals.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tracing::warn;
use uuid::Uuid;

use super::repository::LedgerStore;
use crate::request::{RequestStatus, RoomRequest};
use crate::room::Room;
use crate::user::UserProfile;
use crate::{Error, Result};

const SNAPSHOT_CHANNEL_CAPACITY: usize = 32;

/// Full rooms + requests state, published to push subscribers after
/// every successful mutation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub rooms: Vec<Room>,
    pub requests: Vec<RoomRequest>,
}

#[derive(Default)]
struct LedgerState {
    rooms: HashMap<Uuid, Room>,
    requests: HashMap<Uuid, RoomRequest>,
}

impl LedgerState {
    fn snapshot(&self) -> LedgerSnapshot {
        let mut rooms: Vec<Room> = self.rooms.values().cloned().collect();
        rooms.sort_by(|a, b| a.name.cmp(&b.name));

        let mut requests: Vec<RoomRequest> = self.requests.values().cloned().collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        LedgerSnapshot { rooms, requests }
    }

    fn has_active_request(&self, uid: &str) -> bool {
        self.requests
            .values()
            .any(|r| r.uid == uid && r.status.is_active())
    }
}

/// File-backed ledger over `rooms.json` and `requests.json`
pub struct FileLedgerStore {
    rooms_path: PathBuf,
    requests_path: PathBuf,
    state: RwLock<LedgerState>,
    snapshots: broadcast::Sender<LedgerSnapshot>,
}

impl FileLedgerStore {
    /// Create a new FileLedgerStore under the given data directory
    ///
    /// Missing collection files are created on first write.
    pub async fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        let rooms_path = data_dir.join("rooms.json");
        let requests_path = data_dir.join("requests.json");

        let rooms = Self::load_collection::<Room>(&rooms_path).await?;
        let requests = Self::load_collection::<RoomRequest>(&requests_path).await?;

        let state = LedgerState {
            rooms: rooms.into_iter().map(|r| (r.id, r)).collect(),
            requests: requests.into_iter().map(|r| (r.id, r)).collect(),
        };

        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);

        Ok(Self {
            rooms_path,
            requests_path,
            state: RwLock::new(state),
            snapshots,
        })
    }

    async fn load_collection<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<Vec<T>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(Vec::new())
        }
    }

    /// Subscribe to snapshot broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerSnapshot> {
        self.snapshots.subscribe()
    }

    /// Current full snapshot
    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.state.read().await.snapshot()
    }

    /// Persist both collections and notify subscribers
    async fn commit(&self) -> Result<()> {
        let snapshot = {
            let state = self.state.read().await;
            state.snapshot()
        };

        if let Some(parent) = self.rooms_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let rooms = serde_json::to_string_pretty(&snapshot.rooms)?;
        tokio::fs::write(&self.rooms_path, rooms).await?;

        let requests = serde_json::to_string_pretty(&snapshot.requests)?;
        tokio::fs::write(&self.requests_path, requests).await?;

        // No receivers is fine; push delivery is best-effort.
        let _ = self.snapshots.send(snapshot);
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for FileLedgerStore {
    async fn add_room(&self, name: &str, capacity: u32, occupants: u32) -> Result<Room> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("room name cannot be empty".to_string()));
        }
        if occupants > capacity {
            return Err(Error::InvalidInput(format!(
                "occupants ({}) cannot exceed capacity ({})",
                occupants, capacity
            )));
        }

        let room = Room::new(name, capacity).with_occupants(occupants);
        {
            let mut state = self.state.write().await;
            state.rooms.insert(room.id, room.clone());
        }
        self.commit().await?;
        Ok(room)
    }

    async fn get_room(&self, id: Uuid) -> Result<Option<Room>> {
        let state = self.state.read().await;
        Ok(state.rooms.get(&id).cloned())
    }

    async fn list_rooms(&self) -> Result<Vec<Room>> {
        let state = self.state.read().await;
        let mut rooms: Vec<Room> = state.rooms.values().cloned().collect();
        rooms.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rooms)
    }

    async fn update_room(
        &self,
        id: Uuid,
        capacity: Option<u32>,
        occupants: Option<u32>,
    ) -> Result<Room> {
        let updated = {
            let mut state = self.state.write().await;
            let room = state
                .rooms
                .get_mut(&id)
                .ok_or_else(|| Error::RoomNotFound(id.to_string()))?;

            let new_capacity = capacity.unwrap_or(room.capacity);
            let new_occupants = occupants.unwrap_or(room.occupants);
            if new_occupants > new_capacity {
                return Err(Error::InvalidInput(format!(
                    "occupants ({}) cannot exceed capacity ({})",
                    new_occupants, new_capacity
                )));
            }

            room.capacity = new_capacity;
            room.occupants = new_occupants;
            room.clone()
        };
        self.commit().await?;
        Ok(updated)
    }

    async fn delete_room(&self, id: Uuid) -> Result<bool> {
        let removed = {
            let mut state = self.state.write().await;
            state.rooms.remove(&id).is_some()
        };
        if removed {
            self.commit().await?;
        }
        Ok(removed)
    }

    async fn submit_request(&self, profile: &UserProfile, room_id: Uuid) -> Result<RoomRequest> {
        if !profile.is_complete_for_request() {
            return Err(Error::InvalidInput(
                "profile is missing name, email or index number".to_string(),
            ));
        }

        let request = {
            let mut state = self.state.write().await;

            if state.has_active_request(&profile.uid) {
                return Err(Error::DuplicateRequest(format!(
                    "uid {} already has a pending or approved request",
                    profile.uid
                )));
            }

            let room = state
                .rooms
                .get(&room_id)
                .ok_or_else(|| Error::RoomNotFound(room_id.to_string()))?;

            let request = RoomRequest::new(profile, room_id, &room.name);
            state.requests.insert(request.id, request.clone());
            request
        };
        self.commit().await?;
        Ok(request)
    }

    async fn get_request(&self, id: Uuid) -> Result<Option<RoomRequest>> {
        let state = self.state.read().await;
        Ok(state.requests.get(&id).cloned())
    }

    async fn list_requests(&self) -> Result<Vec<RoomRequest>> {
        let state = self.state.read().await;
        let mut requests: Vec<RoomRequest> = state.requests.values().cloned().collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn find_by_status(&self, status: RequestStatus) -> Result<Vec<RoomRequest>> {
        let state = self.state.read().await;
        let mut requests: Vec<RoomRequest> = state
            .requests
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn requests_for_uid(&self, uid: &str) -> Result<Vec<RoomRequest>> {
        let state = self.state.read().await;
        let mut requests: Vec<RoomRequest> = state
            .requests
            .values()
            .filter(|r| r.uid == uid)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn approved_requests_for_room(&self, room_name: &str) -> Result<Vec<RoomRequest>> {
        let state = self.state.read().await;
        let mut requests: Vec<RoomRequest> = state
            .requests
            .values()
            .filter(|r| r.status == RequestStatus::Approved && r.room_name == room_name)
            .cloned()
            .collect();
        requests.sort_by(|a, b| a.student_id.cmp(&b.student_id));
        Ok(requests)
    }

    async fn approve(&self, request_id: Uuid, room_id: Uuid) -> Result<RoomRequest> {
        let approved = {
            let mut guard = self.state.write().await;
            let state = &mut *guard;

            let request = state
                .requests
                .get_mut(&request_id)
                .ok_or_else(|| Error::RequestNotFound(request_id.to_string()))?;

            if request.status != RequestStatus::Pending {
                return Err(Error::InvalidTransition(format!(
                    "cannot approve a request in state '{}'",
                    request.status.as_str()
                )));
            }
            if request.room_id != room_id {
                return Err(Error::InvalidInput(format!(
                    "room {} does not match the request",
                    room_id
                )));
            }

            let room = state
                .rooms
                .get_mut(&room_id)
                .ok_or_else(|| Error::RoomNotFound(room_id.to_string()))?;

            if !room.has_vacancy() {
                return Err(Error::RoomFull(room.name.clone()));
            }

            room.occupants += 1;
            request.status = RequestStatus::Approved;
            request.clone()
        };
        self.commit().await?;
        Ok(approved)
    }

    async fn reject(&self, request_id: Uuid) -> Result<RoomRequest> {
        let rejected = {
            let mut state = self.state.write().await;
            let request = state
                .requests
                .get_mut(&request_id)
                .ok_or_else(|| Error::RequestNotFound(request_id.to_string()))?;

            match request.status {
                // Re-rejecting just rewrites the same value.
                RequestStatus::Pending | RequestStatus::NotApproved => {
                    request.status = RequestStatus::NotApproved;
                }
                RequestStatus::Approved => {
                    return Err(Error::InvalidTransition(
                        "approved requests are released via occupant removal".to_string(),
                    ));
                }
            }
            request.clone()
        };
        self.commit().await?;
        Ok(rejected)
    }

    async fn remove_occupant(&self, request_id: Uuid, room_id: Uuid) -> Result<RoomRequest> {
        let removed = {
            let mut guard = self.state.write().await;
            let state = &mut *guard;

            let request = state
                .requests
                .get_mut(&request_id)
                .ok_or_else(|| Error::RequestNotFound(request_id.to_string()))?;

            if request.status != RequestStatus::Approved {
                return Err(Error::InvalidTransition(format!(
                    "cannot remove an occupant for a request in state '{}'",
                    request.status.as_str()
                )));
            }
            if request.room_id != room_id {
                return Err(Error::InvalidInput(format!(
                    "room {} does not match the request",
                    room_id
                )));
            }

            match state.rooms.get_mut(&room_id) {
                Some(room) => {
                    room.occupants = room.occupants.saturating_sub(1);
                }
                // The room may have been deleted; the request is still released.
                None => warn!("Removing occupant for deleted room {}", room_id),
            }

            request.status = RequestStatus::NotApproved;
            request.clone()
        };
        self.commit().await?;
        Ok(removed)
    }
}
