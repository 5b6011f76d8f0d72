//! Ledger storage trait
//!
//! Defines the interface the approval workflow is invoked through, so
//! route handlers and tests can run against any backing store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::request::{RequestStatus, RoomRequest};
use crate::room::Room;
use crate::user::UserProfile;
use crate::Result;

/// Storage interface for rooms, requests and the approval workflow
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Create a new room
    async fn add_room(&self, name: &str, capacity: u32, occupants: u32) -> Result<Room>;

    /// Get a room by ID
    async fn get_room(&self, id: Uuid) -> Result<Option<Room>>;

    /// Get all rooms
    async fn list_rooms(&self) -> Result<Vec<Room>>;

    /// Update a room's capacity and/or occupants
    async fn update_room(
        &self,
        id: Uuid,
        capacity: Option<u32>,
        occupants: Option<u32>,
    ) -> Result<Room>;

    /// Delete a room by ID; requests referencing it are left in place
    async fn delete_room(&self, id: Uuid) -> Result<bool>;

    /// Submit a new room request for the given student
    async fn submit_request(&self, profile: &UserProfile, room_id: Uuid) -> Result<RoomRequest>;

    /// Get a request by ID
    async fn get_request(&self, id: Uuid) -> Result<Option<RoomRequest>>;

    /// Get all requests
    async fn list_requests(&self) -> Result<Vec<RoomRequest>>;

    /// Find requests by status
    async fn find_by_status(&self, status: RequestStatus) -> Result<Vec<RoomRequest>>;

    /// All requests submitted by the given uid
    async fn requests_for_uid(&self, uid: &str) -> Result<Vec<RoomRequest>>;

    /// Approved requests whose denormalized room name matches
    async fn approved_requests_for_room(&self, room_name: &str) -> Result<Vec<RoomRequest>>;

    /// Approve a pending request, taking one bed in its room
    async fn approve(&self, request_id: Uuid, room_id: Uuid) -> Result<RoomRequest>;

    /// Reject a pending request; never touches a room
    async fn reject(&self, request_id: Uuid) -> Result<RoomRequest>;

    /// Remove an approved occupant, freeing their bed
    async fn remove_occupant(&self, request_id: Uuid, room_id: Uuid) -> Result<RoomRequest>;
}
