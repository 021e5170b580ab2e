//! `vitrina-api` — HTTP surface of the marketplace.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
