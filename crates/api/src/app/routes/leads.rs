//! Public lead capture: start a wizard, fill steps in any order, submit.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use vitrina_core::LeadId;
use vitrina_infra::repo::leads as repo;
use vitrina_leads::{Lead, LeadFlow, LeadStatus, LeadStep};

use crate::app::routes::auth::parse_tenant;
use crate::app::{dto, errors, services::AppServices};

/// POST /leads — open a new wizard draft.
pub async fn start(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::StartLeadRequest>,
) -> axum::response::Response {
    let flow = match LeadFlow::parse(&body.flow) {
        Ok(flow) => flow,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let tenant_id = match parse_tenant(&services, body.tenant_id.as_deref()) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let property_id = match body.property_id.as_deref().map(str::parse).transpose() {
        Ok(p) => p,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid property id",
            );
        }
    };

    let lead = Lead::start(flow, tenant_id, property_id, Utc::now());
    if let Err(e) = repo::insert(&services.pool, &lead).await {
        return errors::store_error_to_response(e);
    }

    tracing::info!(lead_id = %lead.id, flow = flow.as_str(), "lead started");
    (StatusCode::CREATED, Json(dto::lead_to_json(&lead, &[]))).into_response()
}

/// GET /leads/{id} — the draft plus all steps written so far.
pub async fn fetch(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let (lead, steps) = match load(&services, &id).await {
        Ok(pair) => pair,
        Err(resp) => return resp,
    };
    (StatusCode::OK, Json(dto::lead_to_json(&lead, &steps))).into_response()
}

/// PUT /leads/{id}/steps/{step} — upsert one wizard step.
///
/// Contact fields found in the payload are folded into the lead row so a
/// wizard abandoned mid-way still leaves a reachable contact.
pub async fn upsert_step(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, step)): Path<(String, i32)>,
    Json(payload): Json<serde_json::Value>,
) -> axum::response::Response {
    let lead = match load_lead(&services, &id).await {
        Ok(lead) => lead,
        Err(resp) => return resp,
    };
    if lead.status != LeadStatus::Open {
        return errors::json_error(
            StatusCode::CONFLICT,
            "conflict",
            format!("lead is {}", lead.status.as_str()),
        );
    }
    if let Err(e) = lead.flow.validate_step(step) {
        return errors::domain_error_to_response(e);
    }

    let now = Utc::now();
    let record = LeadStep {
        lead_id: lead.id,
        step_number: step,
        payload,
        submitted_at: now,
    };
    if let Err(e) = repo::upsert_step(&services.pool, &record).await {
        return errors::store_error_to_response(e);
    }

    let mut contact = lead.contact.clone();
    contact.merge_from_payload(&record.payload);
    if contact != lead.contact {
        if let Err(e) = repo::update_contact(&services.pool, lead.id, &contact, now).await {
            return errors::store_error_to_response(e);
        }
    }

    match load(&services, &id).await {
        Ok((lead, steps)) => {
            (StatusCode::OK, Json(dto::lead_to_json(&lead, &steps))).into_response()
        }
        Err(resp) => resp,
    }
}

/// POST /leads/{id}/submit. Re-submitting is a no-op; a discarded lead is a
/// conflict.
pub async fn submit(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let lead = match load_lead(&services, &id).await {
        Ok(lead) => lead,
        Err(resp) => return resp,
    };

    match lead.can_submit() {
        Ok(true) => {
            if let Err(e) =
                repo::set_status(&services.pool, lead.id, LeadStatus::Submitted, Utc::now()).await
            {
                return errors::store_error_to_response(e);
            }
            tracing::info!(lead_id = %lead.id, "lead submitted");
        }
        Ok(false) => {}
        Err(e) => return errors::domain_error_to_response(e),
    }

    match load(&services, &id).await {
        Ok((lead, steps)) => {
            (StatusCode::OK, Json(dto::lead_to_json(&lead, &steps))).into_response()
        }
        Err(resp) => resp,
    }
}

async fn load_lead(
    services: &AppServices,
    id: &str,
) -> Result<Lead, axum::response::Response> {
    let id = id.parse::<LeadId>().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid lead id")
    })?;
    match repo::fetch(&services.pool, id).await {
        Ok(Some(lead)) => Ok(lead),
        Ok(None) => Err(errors::hidden_not_found()),
        Err(e) => Err(errors::store_error_to_response(e)),
    }
}

async fn load(
    services: &AppServices,
    id: &str,
) -> Result<(Lead, Vec<LeadStep>), axum::response::Response> {
    let lead = load_lead(services, id).await?;
    let steps = repo::fetch_steps(&services.pool, lead.id)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok((lead, steps))
}
