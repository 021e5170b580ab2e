//! `vitrina-listings` — marketplace (non-real-estate) item domain.

pub mod listing;

pub use listing::{
    Listing, ListingDraft, ListingStatus, ListingUpdate, PublishOutcome, validate_currency,
    validate_price,
};
