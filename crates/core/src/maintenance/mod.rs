//! Maintenance request lifecycle
//!
//! Two-stage workflow: requests are approved or rejected, and an
//! approved request is promoted into the ongoing-maintenance collection
//! where it is later marked fixed or not fixed.

mod model;
mod store;

pub use model::{
    MaintenanceRequest, MaintenanceStatus, NewMaintenanceRequest, OngoingMaintenance,
    OngoingStatus,
};
pub use store::FileMaintenanceStore;
