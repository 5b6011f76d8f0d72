//! User profiles and roles

mod model;
mod store;

pub use model::{NewUser, UserProfile, UserRole};
pub use store::FileUserStore;
