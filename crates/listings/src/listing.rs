use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrina_core::{DomainError, DomainResult, ListingId, TenantId, UserId};

const MAX_TITLE_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 8000;

/// Listing status lifecycle: `draft` → `published` → (`archived` | `sold`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Draft,
    Published,
    Archived,
    Sold,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
            Self::Sold => "sold",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            "sold" => Ok(Self::Sold),
            other => Err(DomainError::validation(format!(
                "unknown listing status '{other}'"
            ))),
        }
    }

    /// Published rows count against the owner's subscription limit.
    pub fn counts_against_limit(&self) -> bool {
        !matches!(self, Self::Draft)
    }

    /// Decide a publish attempt from the current status and the owner's
    /// standing against their limit. Re-publishing never double-counts.
    pub fn publish_outcome(self, held: i64, max_allowed: i64) -> PublishOutcome {
        match self {
            Self::Published => PublishOutcome::AlreadyPublished,
            Self::Archived | Self::Sold => PublishOutcome::NotPublishable,
            Self::Draft if held >= max_allowed => PublishOutcome::LimitReached,
            Self::Draft => PublishOutcome::Publish,
        }
    }
}

/// Outcome of a publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Draft with headroom left: go ahead.
    Publish,
    /// Already published; treat as a successful no-op.
    AlreadyPublished,
    /// Archived or sold rows never go back to published.
    NotPublishable,
    /// The owner already holds as many published rows as allowed.
    LimitReached,
}

/// A marketplace item record owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub tenant_id: TenantId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Price in minor currency units (cents).
    pub price: i64,
    pub currency: String,
    pub location: Option<String>,
    /// Relative media paths, served via `/media/`.
    pub images: Vec<String>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a listing draft.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: i64,
    pub currency: String,
    pub location: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl ListingDraft {
    pub fn validate(&self) -> DomainResult<()> {
        validate_title(&self.title)?;
        validate_description(&self.description)?;
        if self.category.trim().is_empty() {
            return Err(DomainError::validation("category must not be empty"));
        }
        validate_price(self.price)?;
        validate_currency(&self.currency)?;
        Ok(())
    }

    /// Materialize the draft into a full record.
    pub fn into_listing(self, tenant_id: TenantId, owner_id: UserId, now: DateTime<Utc>) -> Listing {
        Listing {
            id: ListingId::new(),
            tenant_id,
            owner_id,
            title: self.title,
            description: self.description,
            category: self.category,
            price: self.price,
            currency: self.currency.to_uppercase(),
            location: self.location,
            images: self.images,
            status: ListingStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a listing's mutable fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
    pub currency: Option<String>,
    pub location: Option<String>,
    pub images: Option<Vec<String>>,
}

impl ListingUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        if let Some(category) = &self.category {
            if category.trim().is_empty() {
                return Err(DomainError::validation("category must not be empty"));
            }
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(currency) = &self.currency {
            validate_currency(currency)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.currency.is_none()
            && self.location.is_none()
            && self.images.is_none()
    }
}

fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::validation(format!(
            "title exceeds {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> DomainResult<()> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(DomainError::validation(format!(
            "description exceeds {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

/// Prices are minor units and never negative.
pub fn validate_price(price: i64) -> DomainResult<()> {
    if price < 0 {
        return Err(DomainError::validation("price must not be negative"));
    }
    Ok(())
}

/// Currency codes are three ASCII letters (ISO 4217 shape, not the full list).
pub fn validate_currency(currency: &str) -> DomainResult<()> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "currency '{currency}' is not a 3-letter code"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ListingDraft {
        ListingDraft {
            title: "Mountain bike".to_string(),
            description: "Barely used".to_string(),
            category: "sports".to_string(),
            price: 25_000,
            currency: "eur".to_string(),
            location: Some("Valencia".to_string()),
            images: vec!["listings/bike.jpg".to_string()],
        }
    }

    #[test]
    fn draft_materializes_as_draft_status() {
        let d = draft();
        d.validate().unwrap();
        let listing = d.into_listing(TenantId::new(), UserId::new(), Utc::now());
        assert_eq!(listing.status, ListingStatus::Draft);
        assert_eq!(listing.currency, "EUR");
    }

    #[test]
    fn empty_title_is_rejected() {
        let mut d = draft();
        d.title = "   ".to_string();
        assert!(matches!(d.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut d = draft();
        d.price = -1;
        assert!(d.validate().is_err());
    }

    #[test]
    fn bad_currency_is_rejected() {
        for bad in ["EURO", "E1", "", "€€€"] {
            assert!(validate_currency(bad).is_err(), "expected reject: {bad}");
        }
        assert!(validate_currency("USD").is_ok());
    }

    #[test]
    fn status_roundtrip_and_limit_accounting() {
        for s in [
            ListingStatus::Draft,
            ListingStatus::Published,
            ListingStatus::Archived,
            ListingStatus::Sold,
        ] {
            assert_eq!(ListingStatus::parse(s.as_str()).unwrap(), s);
        }
        assert!(!ListingStatus::Draft.counts_against_limit());
        assert!(ListingStatus::Published.counts_against_limit());
    }

    #[test]
    fn draft_publishes_while_under_the_limit() {
        assert_eq!(
            ListingStatus::Draft.publish_outcome(1, 2),
            PublishOutcome::Publish
        );
        assert_eq!(
            ListingStatus::Draft.publish_outcome(2, 2),
            PublishOutcome::LimitReached
        );
        assert_eq!(
            ListingStatus::Draft.publish_outcome(3, 2),
            PublishOutcome::LimitReached
        );
    }

    #[test]
    fn republish_is_a_no_op_even_at_the_limit() {
        // A published row must read as no-op, never as another count.
        assert_eq!(
            ListingStatus::Published.publish_outcome(2, 2),
            PublishOutcome::AlreadyPublished
        );
        assert_eq!(
            ListingStatus::Published.publish_outcome(0, 2),
            PublishOutcome::AlreadyPublished
        );
    }

    #[test]
    fn retired_rows_never_republish() {
        for s in [ListingStatus::Archived, ListingStatus::Sold] {
            assert_eq!(s.publish_outcome(0, 10), PublishOutcome::NotPublishable);
        }
    }

    #[test]
    fn update_validation_checks_only_present_fields() {
        let upd = ListingUpdate {
            price: Some(100),
            ..Default::default()
        };
        upd.validate().unwrap();

        let upd = ListingUpdate {
            currency: Some("x".to_string()),
            ..Default::default()
        };
        assert!(upd.validate().is_err());
    }
}
