use std::collections::HashSet;

use thiserror::Error;

use crate::{permissions_for_role, Permission, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a role against a required permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(role: &Role, required: &Permission) -> Result<(), AuthzError> {
    let granted = permissions_for_role(role);
    let perms: HashSet<&str> = granted.iter().map(|p| p.as_str()).collect();

    if perms.contains("*") || perms.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_wildcard_covers_everything() {
        assert!(authorize(&Role::admin(), &Permission::new("leads.list")).is_ok());
        assert!(authorize(&Role::admin(), &Permission::new("listings.publish")).is_ok());
    }

    #[test]
    fn user_can_publish_but_not_administer() {
        assert!(authorize(&Role::user(), &Permission::new("listings.publish")).is_ok());
        let err = authorize(&Role::user(), &Permission::new("admin.stats")).unwrap_err();
        assert_eq!(err, AuthzError::Forbidden("admin.stats".to_string()));
    }

    #[test]
    fn unknown_role_gets_nothing() {
        assert!(authorize(&Role::new("bot"), &Permission::new("listings.write")).is_err());
    }
}
