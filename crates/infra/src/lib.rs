//! `vitrina-infra` — Postgres persistence.
//!
//! One repository module per domain area. Every function is a direct,
//! single-statement (occasionally two-statement) translation of an operation
//! into SQL; there is no shared mutable in-process state.
//!
//! ## Tenant Isolation
//!
//! Every query against a tenant-carrying table includes `tenant_id` in the
//! WHERE clause or the inserted row.

pub mod db;
pub mod error;
pub mod repo;

pub use db::{connect, connect_lazy};
pub use error::{StoreError, StoreResult};
