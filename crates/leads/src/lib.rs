//! `vitrina-leads` — multi-step inquiry drafts (lead capture).
//!
//! A lead is a draft keyed by id; steps are incremental row upserts, last
//! write wins. There is no state machine beyond range-checking the step
//! number against the flow.

pub mod lead;

pub use lead::{ContactDetails, Lead, LeadFlow, LeadStatus, LeadStep};
