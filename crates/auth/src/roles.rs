use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier used for RBAC.
///
/// Roles are intentionally opaque strings at this layer; the well-known roles
/// of the marketplace are exposed as constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Regular marketplace user: owns listings/properties.
    pub fn user() -> Self {
        Self(Cow::Borrowed("user"))
    }

    /// Agency account: same surface as a user, tenant-scoped to the agency.
    pub fn agency() -> Self {
        Self(Cow::Borrowed("agency"))
    }

    /// Back-office administrator.
    pub fn admin() -> Self {
        Self(Cow::Borrowed("admin"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.as_str() == "admin"
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
