use serde::Deserialize;
use serde_json::{Value, json};

use vitrina_auth::UserAccount;
use vitrina_leads::{Lead, LeadStep};
use vitrina_listings::Listing;
use vitrina_properties::Property;
use vitrina_subscriptions::{Entitlements, Plan, Subscription};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    /// Defaults to the marketplace tenant when absent.
    pub tenant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub tenant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StartLeadRequest {
    pub flow: String,
    pub tenant_id: Option<String>,
    pub property_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PatchUserRequest {
    pub role: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub code: String,
    pub name: String,
    pub price: i64,
    pub currency: String,
    pub max_listings: i64,
    pub max_properties: i64,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub analytics: bool,
    #[serde(default)]
    pub priority_support: bool,
}

#[derive(Debug, Deserialize)]
pub struct PatchPlanRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub max_listings: Option<i64>,
    pub max_properties: Option<i64>,
    pub featured: Option<bool>,
    pub analytics: Option<bool>,
    pub priority_support: Option<bool>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct GrantSubscriptionRequest {
    pub user_id: String,
    pub plan_id: String,
    /// Whole days; defaults to 30.
    pub period_days: Option<i64>,
    pub payment_status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PatchSubscriptionRequest {
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

// -------------------------
// Response mapping
// -------------------------

pub fn listing_to_json(l: &Listing) -> Value {
    json!({
        "id": l.id.to_string(),
        "tenant_id": l.tenant_id.to_string(),
        "owner_id": l.owner_id.to_string(),
        "title": l.title,
        "description": l.description,
        "category": l.category,
        "price": l.price,
        "currency": l.currency,
        "location": l.location,
        "images": l.images,
        "status": l.status.as_str(),
        "created_at": l.created_at,
        "updated_at": l.updated_at,
    })
}

pub fn property_to_json(p: &Property) -> Value {
    json!({
        "id": p.id.to_string(),
        "tenant_id": p.tenant_id.to_string(),
        "owner_id": p.owner_id.to_string(),
        "title": p.title,
        "description": p.description,
        "kind": p.kind.as_str(),
        "deal": p.deal.as_str(),
        "price": p.price,
        "currency": p.currency,
        "area_m2": p.area_m2,
        "rooms": p.rooms,
        "floor": p.floor,
        "address": p.address,
        "city": p.city,
        "images": p.images,
        "status": p.status.as_str(),
        "created_at": p.created_at,
        "updated_at": p.updated_at,
    })
}

pub fn lead_to_json(lead: &Lead, steps: &[LeadStep]) -> Value {
    json!({
        "id": lead.id.to_string(),
        "tenant_id": lead.tenant_id.to_string(),
        "flow": lead.flow.as_str(),
        "status": lead.status.as_str(),
        "step_count": lead.flow.step_count(),
        "contact": {
            "name": lead.contact.name,
            "email": lead.contact.email,
            "phone": lead.contact.phone,
        },
        "property_id": lead.property_id.map(|p| p.to_string()),
        "steps": steps.iter().map(|s| json!({
            "step_number": s.step_number,
            "payload": s.payload,
            "submitted_at": s.submitted_at,
        })).collect::<Vec<_>>(),
        "created_at": lead.created_at,
        "updated_at": lead.updated_at,
    })
}

/// Password hash never crosses this boundary.
pub fn user_to_json(u: &UserAccount) -> Value {
    json!({
        "id": u.id.to_string(),
        "tenant_id": u.tenant_id.to_string(),
        "email": u.email,
        "display_name": u.display_name,
        "role": u.role.as_str(),
        "active": u.active,
        "created_at": u.created_at,
        "updated_at": u.updated_at,
    })
}

pub fn plan_to_json(p: &Plan) -> Value {
    json!({
        "id": p.id.to_string(),
        "code": p.code,
        "name": p.name,
        "price": p.price,
        "currency": p.currency,
        "entitlements": entitlements_to_json(&p.entitlements),
        "active": p.active,
        "created_at": p.created_at,
    })
}

pub fn entitlements_to_json(e: &Entitlements) -> Value {
    json!({
        "max_listings": e.max_listings,
        "max_properties": e.max_properties,
        "featured": e.featured,
        "analytics": e.analytics,
        "priority_support": e.priority_support,
    })
}

pub fn subscription_to_json(s: &Subscription) -> Value {
    json!({
        "id": s.id.to_string(),
        "user_id": s.user_id.to_string(),
        "plan_id": s.plan_id.to_string(),
        "status": s.status.as_str(),
        "payment_status": s.payment_status.as_str(),
        "period_start": s.period_start,
        "period_end": s.period_end,
        "created_at": s.created_at,
        "updated_at": s.updated_at,
    })
}
