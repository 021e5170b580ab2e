use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrina_core::{DomainError, DomainResult, PlanId, SubscriptionId, UserId};

use crate::plan::Entitlements;

/// Subscription lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Canceled,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "active" => Ok(Self::Active),
            "past_due" => Ok(Self::PastDue),
            "canceled" => Ok(Self::Canceled),
            "expired" => Ok(Self::Expired),
            other => Err(DomainError::validation(format!(
                "unknown subscription status '{other}'"
            ))),
        }
    }
}

/// Payment status of a subscription row. Data, not a gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(DomainError::validation(format!(
                "unknown payment status '{other}'"
            ))),
        }
    }
}

/// A user's paid plan record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub status: SubscriptionStatus,
    pub payment_status: PaymentStatus,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Whether this row grants entitlements at `now`.
    pub fn is_effective(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active
            && self.period_start <= now
            && now < self.period_end
    }
}

/// Resolve the entitlements for a user given their newest effective
/// subscription's plan, falling back to the free tier.
pub fn effective_entitlements(plan_entitlements: Option<Entitlements>) -> Entitlements {
    plan_entitlements.unwrap_or_else(Entitlements::free_tier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sub(status: SubscriptionStatus, start: DateTime<Utc>, end: DateTime<Utc>) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: SubscriptionId::new(),
            user_id: UserId::new(),
            plan_id: PlanId::new(),
            status,
            payment_status: PaymentStatus::Paid,
            period_start: start,
            period_end: end,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn active_in_period_is_effective() {
        let now = Utc::now();
        let s = sub(
            SubscriptionStatus::Active,
            now - Duration::days(1),
            now + Duration::days(29),
        );
        assert!(s.is_effective(now));
    }

    #[test]
    fn lapsed_or_inactive_is_not_effective() {
        let now = Utc::now();
        let s = sub(
            SubscriptionStatus::Active,
            now - Duration::days(60),
            now - Duration::days(30),
        );
        assert!(!s.is_effective(now));

        let s = sub(
            SubscriptionStatus::Canceled,
            now - Duration::days(1),
            now + Duration::days(29),
        );
        assert!(!s.is_effective(now));
    }

    #[test]
    fn fallback_is_free_tier() {
        assert_eq!(effective_entitlements(None), Entitlements::free_tier());
    }

    #[test]
    fn status_parse_roundtrip() {
        for s in ["active", "past_due", "canceled", "expired"] {
            assert_eq!(SubscriptionStatus::parse(s).unwrap().as_str(), s);
        }
        for p in ["pending", "paid", "failed", "refunded"] {
            assert_eq!(PaymentStatus::parse(p).unwrap().as_str(), p);
        }
    }
}
