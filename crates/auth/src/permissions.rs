use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "listings.publish").
/// The wildcard permission `"*"` indicates "allow all" without hardcoding
/// every domain permission into the policy table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static role → permission policy.
///
/// No IO; the session middleware resolves the role, handlers check against
/// this table via [`crate::authorize`].
pub fn permissions_for_role(role: &Role) -> Vec<Permission> {
    match role.as_str() {
        "admin" => vec![Permission::new("*")],
        "agency" | "user" => vec![
            Permission::new("listings.write"),
            Permission::new("listings.publish"),
            Permission::new("properties.write"),
            Permission::new("properties.publish"),
            Permission::new("subscription.read"),
        ],
        _ => Vec::new(),
    }
}
