//! Entry/exit logging

mod model;
mod store;

pub use model::{hash_credential, EntryExitLog, EntryKind};
pub use store::EntryExitStore;
