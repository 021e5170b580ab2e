//! `vitrina-subscriptions` — plans, user subscriptions, payment status and
//! the entitlements that gate publishing.

pub mod plan;
pub mod subscription;

pub use plan::{Entitlements, Plan};
pub use subscription::{PaymentStatus, Subscription, SubscriptionStatus, effective_entitlements};
