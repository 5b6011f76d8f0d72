//! Room request models

mod model;

pub use model::{RequestStatus, RoomRequest};
