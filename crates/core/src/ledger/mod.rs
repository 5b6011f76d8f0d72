//! Occupancy ledger
//!
//! Owns the `rooms` and `requests` collections together so the approval
//! workflow can mutate both under one critical section. Every successful
//! mutation publishes a fresh snapshot for push subscribers.

mod repository;
mod store;

pub use repository::LedgerStore;
pub use store::{FileLedgerStore, LedgerSnapshot};
