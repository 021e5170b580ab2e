//! `vitrina-core` — shared domain foundation.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the domain error model, and pagination.

pub mod error;
pub mod id;
pub mod page;

pub use error::{DomainError, DomainResult};
pub use id::{
    LeadId, ListingId, PlanId, PropertyId, SessionId, SubscriptionId, TenantId, UserId,
};
pub use page::{Page, PageQuery};
