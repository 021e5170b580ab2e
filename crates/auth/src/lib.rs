//! `vitrina-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it models
//! session tokens, password hashing and the role → permission policy. The API
//! layer owns cookie/header plumbing and the session table lookup.

pub mod authorize;
pub mod password;
pub mod permissions;
pub mod roles;
pub mod session;
pub mod user;

pub use authorize::{authorize, AuthzError};
pub use password::{hash_password, verify_password};
pub use permissions::{permissions_for_role, Permission};
pub use roles::Role;
pub use session::{digest_token, validate_session, SessionClaims, SessionToken, SessionValidationError};
pub use user::{normalize_email, validate_new_password, UserAccount};
