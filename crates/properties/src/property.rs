use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrina_core::{DomainError, DomainResult, PropertyId, TenantId, UserId};
use vitrina_listings::{ListingStatus, validate_currency, validate_price};

const MAX_TITLE_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 8000;

/// Real-estate category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Apartment,
    House,
    Room,
    Office,
    Land,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apartment => "apartment",
            Self::House => "house",
            Self::Room => "room",
            Self::Office => "office",
            Self::Land => "land",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "apartment" => Ok(Self::Apartment),
            "house" => Ok(Self::House),
            "room" => Ok(Self::Room),
            "office" => Ok(Self::Office),
            "land" => Ok(Self::Land),
            other => Err(DomainError::validation(format!(
                "unknown property kind '{other}'"
            ))),
        }
    }
}

/// Deal type: sale or rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deal {
    Sale,
    Rent,
}

impl Deal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Rent => "rent",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "sale" => Ok(Self::Sale),
            "rent" => Ok(Self::Rent),
            other => Err(DomainError::validation(format!("unknown deal '{other}'"))),
        }
    }
}

/// A real-estate record owned by a user. Shares the listing status lifecycle
/// (`draft` → `published` → `archived`/`sold`) but lives in its own table and
/// counts against its own subscription limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub tenant_id: TenantId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub kind: PropertyKind,
    pub deal: Deal,
    /// Price in minor currency units; monthly for rentals.
    pub price: i64,
    pub currency: String,
    pub area_m2: Option<f64>,
    pub rooms: Option<i32>,
    pub floor: Option<i32>,
    pub address: Option<String>,
    pub city: String,
    pub images: Vec<String>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a property draft.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertyDraft {
    pub title: String,
    pub description: String,
    pub kind: PropertyKind,
    pub deal: Deal,
    pub price: i64,
    pub currency: String,
    pub area_m2: Option<f64>,
    pub rooms: Option<i32>,
    pub floor: Option<i32>,
    pub address: Option<String>,
    pub city: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl PropertyDraft {
    pub fn validate(&self) -> DomainResult<()> {
        validate_title(&self.title)?;
        validate_description(&self.description)?;
        validate_price(self.price)?;
        validate_currency(&self.currency)?;
        validate_area(self.area_m2)?;
        validate_rooms(self.rooms)?;
        if self.city.trim().is_empty() {
            return Err(DomainError::validation("city must not be empty"));
        }
        Ok(())
    }

    pub fn into_property(
        self,
        tenant_id: TenantId,
        owner_id: UserId,
        now: DateTime<Utc>,
    ) -> Property {
        Property {
            id: PropertyId::new(),
            tenant_id,
            owner_id,
            title: self.title,
            description: self.description,
            kind: self.kind,
            deal: self.deal,
            price: self.price,
            currency: self.currency.to_uppercase(),
            area_m2: self.area_m2,
            rooms: self.rooms,
            floor: self.floor,
            address: self.address,
            city: self.city,
            images: self.images,
            status: ListingStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a property's mutable fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<PropertyKind>,
    pub deal: Option<Deal>,
    pub price: Option<i64>,
    pub currency: Option<String>,
    pub area_m2: Option<f64>,
    pub rooms: Option<i32>,
    pub floor: Option<i32>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub images: Option<Vec<String>>,
}

impl PropertyUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(currency) = &self.currency {
            validate_currency(currency)?;
        }
        validate_area(self.area_m2)?;
        validate_rooms(self.rooms)?;
        if let Some(city) = &self.city {
            if city.trim().is_empty() {
                return Err(DomainError::validation("city must not be empty"));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.kind.is_none()
            && self.deal.is_none()
            && self.price.is_none()
            && self.currency.is_none()
            && self.area_m2.is_none()
            && self.rooms.is_none()
            && self.floor.is_none()
            && self.address.is_none()
            && self.city.is_none()
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

fn validate_area(area_m2: Option<f64>) -> DomainResult<()> {
    match area_m2 {
        Some(a) if !a.is_finite() || a <= 0.0 => {
            Err(DomainError::validation("area_m2 must be positive"))
        }
        _ => Ok(()),
    }
}

fn validate_rooms(rooms: Option<i32>) -> DomainResult<()> {
    match rooms {
        Some(r) if r < 0 => Err(DomainError::validation("rooms must not be negative")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> PropertyDraft {
        PropertyDraft {
            title: "Sunny 3-room apartment".to_string(),
            description: "Close to the old town".to_string(),
            kind: PropertyKind::Apartment,
            deal: Deal::Rent,
            price: 95_000,
            currency: "EUR".to_string(),
            area_m2: Some(78.5),
            rooms: Some(3),
            floor: Some(2),
            address: Some("Carrer de la Pau 4".to_string()),
            city: "Valencia".to_string(),
            images: vec![],
        }
    }

    #[test]
    fn valid_draft_materializes() {
        let d = draft();
        d.validate().unwrap();
        let p = d.into_property(TenantId::new(), UserId::new(), Utc::now());
        assert_eq!(p.status, ListingStatus::Draft);
        assert_eq!(p.kind, PropertyKind::Apartment);
    }

    #[test]
    fn zero_or_nan_area_is_rejected() {
        let mut d = draft();
        d.area_m2 = Some(0.0);
        assert!(d.validate().is_err());
        d.area_m2 = Some(f64::NAN);
        assert!(d.validate().is_err());
        d.area_m2 = None;
        assert!(d.validate().is_ok());
    }

    #[test]
    fn kind_and_deal_roundtrip() {
        for k in [
            PropertyKind::Apartment,
            PropertyKind::House,
            PropertyKind::Room,
            PropertyKind::Office,
            PropertyKind::Land,
        ] {
            assert_eq!(PropertyKind::parse(k.as_str()).unwrap(), k);
        }
        assert_eq!(Deal::parse("rent").unwrap(), Deal::Rent);
        assert!(Deal::parse("lease").is_err());
    }

    #[test]
    fn empty_city_is_rejected() {
        let mut d = draft();
        d.city = String::new();
        assert!(d.validate().is_err());
    }
}
