//! Room model definitions

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A hostel room with a fixed bed capacity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    /// Display label, unique by convention only
    pub name: String,
    /// Total beds in the room
    pub capacity: u32,
    /// Currently assigned occupants, kept within 0..=capacity by the ledger
    pub occupants: u32,
}

impl Room {
    /// Create a new empty room with the given name and capacity
    pub fn new(name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            capacity,
            occupants: 0,
        }
    }

    /// Set the initial occupant count
    pub fn with_occupants(mut self, occupants: u32) -> Self {
        self.occupants = occupants;
        self
    }

    /// Whether at least one bed is free
    pub fn has_vacancy(&self) -> bool {
        self.occupants < self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_room_is_empty() {
        let room = Room::new("A-101", 4);
        assert_eq!(room.name, "A-101");
        assert_eq!(room.capacity, 4);
        assert_eq!(room.occupants, 0);
        assert!(room.has_vacancy());
    }

    #[test]
    fn test_full_room_has_no_vacancy() {
        let room = Room::new("A-102", 2).with_occupants(2);
        assert!(!room.has_vacancy());
    }

    #[test]
    fn test_zero_capacity_room_is_always_full() {
        let room = Room::new("Store", 0);
        assert!(!room.has_vacancy());
    }
}
