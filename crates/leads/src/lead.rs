use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrina_core::{DomainError, DomainResult, LeadId, PropertyId, TenantId};

/// Lead flow type. Each flow has a fixed number of wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadFlow {
    Rent,
    Buy,
    Sell,
    Appraisal,
    Contact,
}

impl LeadFlow {
    pub const ALL: [Self; 5] = [
        Self::Rent,
        Self::Buy,
        Self::Sell,
        Self::Appraisal,
        Self::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Appraisal => "appraisal",
            Self::Contact => "contact",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "rent" => Ok(Self::Rent),
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            "appraisal" => Ok(Self::Appraisal),
            "contact" => Ok(Self::Contact),
            other => Err(DomainError::validation(format!(
                "unknown lead flow '{other}'"
            ))),
        }
    }

    /// Number of wizard steps for this flow (1-based step numbers).
    pub fn step_count(&self) -> i32 {
        match self {
            Self::Rent | Self::Buy => 4,
            Self::Sell => 5,
            Self::Appraisal => 3,
            Self::Contact => 1,
        }
    }

    /// Range-check a 1-based step number against this flow.
    pub fn validate_step(&self, step: i32) -> DomainResult<()> {
        if (1..=self.step_count()).contains(&step) {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "step {step} out of range for flow '{}' (1..={})",
                self.as_str(),
                self.step_count()
            )))
        }
    }
}

/// Lead status. `submitted` is terminal except that re-submitting is a no-op;
/// `discarded` leads can never be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    Open,
    Submitted,
    Discarded,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Submitted => "submitted",
            Self::Discarded => "discarded",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s {
            "open" => Ok(Self::Open),
            "submitted" => Ok(Self::Submitted),
            "discarded" => Ok(Self::Discarded),
            other => Err(DomainError::validation(format!(
                "unknown lead status '{other}'"
            ))),
        }
    }
}

/// Contact columns on the lead row, refreshed from step payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ContactDetails {
    /// Pull `name`/`email`/`phone` out of a step payload, keeping existing
    /// values when the payload does not carry them. Last write wins.
    pub fn merge_from_payload(&mut self, payload: &serde_json::Value) {
        for (key, slot) in [
            ("name", &mut self.name),
            ("email", &mut self.email),
            ("phone", &mut self.phone),
        ] {
            if let Some(v) = payload.get(key).and_then(|v| v.as_str()) {
                if !v.trim().is_empty() {
                    *slot = Some(v.trim().to_string());
                }
            }
        }
    }
}

/// A prospective customer's multi-step inquiry draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub tenant_id: TenantId,
    pub flow: LeadFlow,
    pub status: LeadStatus,
    pub contact: ContactDetails,
    /// Optional reference when the inquiry concerns a specific property.
    pub property_id: Option<PropertyId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    pub fn start(flow: LeadFlow, tenant_id: TenantId, property_id: Option<PropertyId>, now: DateTime<Utc>) -> Self {
        Self {
            id: LeadId::new(),
            tenant_id,
            flow,
            status: LeadStatus::Open,
            contact: ContactDetails::default(),
            property_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a submit request may proceed. `Ok(true)` means "mark
    /// submitted", `Ok(false)` means "already submitted, idempotent no-op".
    pub fn can_submit(&self) -> DomainResult<bool> {
        match self.status {
            LeadStatus::Open => Ok(true),
            LeadStatus::Submitted => Ok(false),
            LeadStatus::Discarded => Err(DomainError::conflict(
                "discarded lead cannot be submitted",
            )),
        }
    }
}

/// One wizard step of a lead: free-form payload, upserted by (lead, step).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadStep {
    pub lead_id: LeadId,
    pub step_number: i32,
    pub payload: serde_json::Value,
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flow_step_counts() {
        assert_eq!(LeadFlow::Rent.step_count(), 4);
        assert_eq!(LeadFlow::Sell.step_count(), 5);
        assert_eq!(LeadFlow::Appraisal.step_count(), 3);
        assert_eq!(LeadFlow::Contact.step_count(), 1);
    }

    #[test]
    fn step_range_check() {
        assert!(LeadFlow::Contact.validate_step(1).is_ok());
        assert!(LeadFlow::Contact.validate_step(2).is_err());
        assert!(LeadFlow::Buy.validate_step(0).is_err());
        assert!(LeadFlow::Buy.validate_step(4).is_ok());
    }

    #[test]
    fn flow_parse_roundtrip() {
        for f in LeadFlow::ALL {
            assert_eq!(LeadFlow::parse(f.as_str()).unwrap(), f);
        }
        assert!(LeadFlow::parse("purchase").is_err());
    }

    #[test]
    fn contact_merge_keeps_existing_on_missing_keys() {
        let mut contact = ContactDetails {
            name: Some("Ada".to_string()),
            email: None,
            phone: None,
        };
        contact.merge_from_payload(&json!({ "email": "ada@example.com", "budget": 900 }));
        assert_eq!(contact.name.as_deref(), Some("Ada"));
        assert_eq!(contact.email.as_deref(), Some("ada@example.com"));
        assert_eq!(contact.phone, None);
    }

    #[test]
    fn contact_merge_ignores_blank_values() {
        let mut contact = ContactDetails::default();
        contact.merge_from_payload(&json!({ "name": "   " }));
        assert_eq!(contact.name, None);
    }

    #[test]
    fn submit_transitions() {
        let mut lead = Lead::start(LeadFlow::Sell, TenantId::new(), None, Utc::now());
        assert_eq!(lead.can_submit().unwrap(), true);

        lead.status = LeadStatus::Submitted;
        assert_eq!(lead.can_submit().unwrap(), false);

        lead.status = LeadStatus::Discarded;
        assert!(lead.can_submit().is_err());
    }
}
