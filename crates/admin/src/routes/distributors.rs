//! Distributor and domain management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

use distrimart_core::{DistributorId, DomainId, DomainStatus};
use distrimart_storefront::models::{Distributor, DistributorDomain};

use crate::db::DistributorRepository;
use crate::db::distributors::DistributorFields;
use crate::error::{AppError, Result};
use crate::models::distributor::{clean_color, clean_domain, clean_name, clean_optional};
use crate::models::{DistributorDetail, DistributorPatch, NewDistributor};
use crate::state::AppState;

fn validate_new(body: &NewDistributor) -> Result<DistributorFields> {
    Ok(DistributorFields {
        name: clean_name(&body.name)?,
        email_domain: clean_domain(&body.email_domain)?,
        logo_url: clean_optional(body.logo_url.as_deref()),
        brand_color: clean_optional(body.brand_color.as_deref())
            .map(|c| clean_color(&c))
            .transpose()?,
        default_discount: body.default_discount,
    })
}

/// Apply a patch over the current values.
fn apply_patch(current: &Distributor, patch: &DistributorPatch) -> Result<DistributorFields> {
    let mut fields = DistributorFields::from(current);

    if let Some(name) = &patch.name {
        fields.name = clean_name(name)?;
    }
    if let Some(domain) = &patch.email_domain {
        fields.email_domain = clean_domain(domain)?;
    }
    if let Some(logo_url) = &patch.logo_url {
        fields.logo_url = clean_optional(logo_url.as_deref());
    }
    if let Some(color) = &patch.brand_color {
        fields.brand_color = clean_optional(color.as_deref())
            .map(|c| clean_color(&c))
            .transpose()?;
    }
    if let Some(discount) = patch.default_discount {
        fields.default_discount = discount;
    }

    Ok(fields)
}

/// List distributors.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Distributor>>> {
    Ok(Json(DistributorRepository::new(state.pool()).list().await?))
}

/// Create a distributor.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewDistributor>,
) -> Result<(StatusCode, Json<Distributor>)> {
    let fields = validate_new(&body)?;
    let distributor = DistributorRepository::new(state.pool()).create(&fields).await?;

    info!(distributor_id = %distributor.id, "Distributor created");
    state.stats().invalidate_and_maybe_warm().await;

    Ok((StatusCode::CREATED, Json(distributor)))
}

/// Distributor with its domains.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<DistributorId>,
) -> Result<Json<DistributorDetail>> {
    let repo = DistributorRepository::new(state.pool());
    let distributor = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("distributor {id}")))?;
    let domains = repo.domains(id).await?;

    Ok(Json(DistributorDetail {
        distributor,
        domains,
    }))
}

/// Update branding, email domain or default discount.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DistributorId>,
    Json(patch): Json<DistributorPatch>,
) -> Result<Json<Distributor>> {
    let repo = DistributorRepository::new(state.pool());
    let current = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("distributor {id}")))?;

    let fields = apply_patch(&current, &patch)?;
    Ok(Json(repo.update(id, &fields).await?))
}

/// Delete a distributor.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DistributorId>,
) -> Result<StatusCode> {
    DistributorRepository::new(state.pool()).delete(id).await?;

    info!(distributor_id = %id, "Distributor deleted");
    state.stats().invalidate_and_maybe_warm().await;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct NewDomain {
    pub domain: String,
}

/// Claim a custom domain; it stays `pending` until verified.
pub async fn add_domain(
    State(state): State<AppState>,
    Path(id): Path<DistributorId>,
    Json(body): Json<NewDomain>,
) -> Result<(StatusCode, Json<DistributorDomain>)> {
    let domain = clean_domain(&body.domain)?;
    let domain = DistributorRepository::new(state.pool())
        .add_domain(id, &domain)
        .await?;
    Ok((StatusCode::CREATED, Json(domain)))
}

#[derive(Debug, Deserialize)]
pub struct DomainStatusBody {
    pub status: DomainStatus,
}

/// Record the outcome of a DNS verification check.
pub async fn set_domain_status(
    State(state): State<AppState>,
    Path(id): Path<DomainId>,
    Json(body): Json<DomainStatusBody>,
) -> Result<Json<DistributorDomain>> {
    let domain = DistributorRepository::new(state.pool())
        .set_domain_status(id, body.status)
        .await?;

    info!(domain = %domain.domain, status = %domain.status, "Domain status updated");
    Ok(Json(domain))
}
