//! Room catalog models

mod model;

pub use model::Room;
