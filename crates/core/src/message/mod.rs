//! Internal messaging

mod model;
mod store;

pub use model::Message;
pub use store::FileMessageStore;
