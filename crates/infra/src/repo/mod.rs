//! Repositories, one module per domain area.

pub mod leads;
pub mod listings;
pub mod plans;
pub mod properties;
pub mod sessions;
pub mod stats;
pub mod subscriptions;
pub mod users;
