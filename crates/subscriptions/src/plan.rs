use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrina_core::{DomainError, DomainResult, PlanId};

/// What a plan entitles its holder to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlements {
    /// Maximum non-draft listings the holder may have at once.
    pub max_listings: i64,
    /// Maximum non-draft properties the holder may have at once.
    pub max_properties: i64,
    pub featured: bool,
    pub analytics: bool,
    pub priority_support: bool,
}

impl Entitlements {
    /// The built-in tier applied when a user has no effective subscription.
    pub fn free_tier() -> Self {
        Self {
            max_listings: 2,
            max_properties: 1,
            featured: false,
            analytics: false,
            priority_support: false,
        }
    }
}

/// A paid plan record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    /// Stable machine code, unique (e.g. "agency-pro").
    pub code: String,
    pub name: String,
    /// Price in minor currency units per period.
    pub price: i64,
    pub currency: String,
    pub entitlements: Entitlements,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Plan {
    pub fn validate(code: &str, name: &str, price: i64, entitlements: &Entitlements) -> DomainResult<()> {
        if code.trim().is_empty()
            || !code
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(DomainError::validation(
                "plan code must be non-empty lowercase-kebab",
            ));
        }
        if name.trim().is_empty() {
            return Err(DomainError::validation("plan name must not be empty"));
        }
        if price < 0 {
            return Err(DomainError::validation("plan price must not be negative"));
        }
        if entitlements.max_listings < 0 || entitlements.max_properties < 0 {
            return Err(DomainError::validation("plan limits must not be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_tier_is_restrictive() {
        let e = Entitlements::free_tier();
        assert_eq!(e.max_listings, 2);
        assert_eq!(e.max_properties, 1);
        assert!(!e.featured && !e.analytics && !e.priority_support);
    }

    #[test]
    fn plan_code_shape() {
        let e = Entitlements::free_tier();
        assert!(Plan::validate("agency-pro-2", "Agency Pro", 4900, &e).is_ok());
        assert!(Plan::validate("Agency Pro", "Agency Pro", 4900, &e).is_err());
        assert!(Plan::validate("", "Agency Pro", 4900, &e).is_err());
        assert!(Plan::validate("agency", "Agency", -1, &e).is_err());
    }
}
