//! `vitrina-properties` — real-estate record domain (distinct table from
//! listings, same status lifecycle).

pub mod property;

pub use property::{Deal, Property, PropertyDraft, PropertyKind, PropertyUpdate};
