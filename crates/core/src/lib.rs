//! Core library for the hostel management backend
//!
//! This crate contains the domain models and business logic, including:
//! - Room and room-request management (occupancy ledger)
//! - User profiles and roles
//! - Maintenance request lifecycle
//! - Entry/exit logging and messaging

pub mod entry_exit;
pub mod error;
pub mod ledger;
pub mod maintenance;
pub mod message;
pub mod request;
pub mod room;
pub mod user;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
