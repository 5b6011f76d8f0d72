//! Error types for the core library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Request not found: {0}")]
    RequestNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Room is already full: {0}")]
    RoomFull(String),

    #[error("Duplicate request: {0}")]
    DuplicateRequest(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
