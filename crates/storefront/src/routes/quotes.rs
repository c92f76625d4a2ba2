//! Quote requests from the storefront.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::{info, instrument};

use distrimart_core::QuoteId;
use distrimart_core::pricing::{LineRequest, merge_lines};

use super::{ensure_same_tenant, parse_customer, validate_lines};
use crate::db::{CatalogRepository, QuoteRepository};
use crate::error::{AppError, Result};
use crate::middleware::CurrentTenant;
use crate::models::{NewQuote, QuoteDetail, QuoteItem};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteRequestBody {
    pub customer_email: String,
    pub customer_name: String,
    pub company: Option<String>,
    pub message: Option<String>,
    pub items: Vec<LineRequest>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Store a pending quote request for the current tenant.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Json(body): Json<QuoteRequestBody>,
) -> Result<(StatusCode, Json<QuoteDetail>)> {
    validate_lines(&body.items)?;
    let (customer_email, customer_name) = parse_customer(&body.customer_email, &body.customer_name)?;

    let catalog = CatalogRepository::new(state.pool());
    let items = merge_lines(&body.items);
    for item in &items {
        if catalog.get_product(item.product_id).await?.is_none() {
            return Err(AppError::NotFound(format!("product {}", item.product_id)));
        }
    }

    let quote = QuoteRepository::new(state.pool())
        .create(&NewQuote {
            distributor_id: tenant.distributor_id(),
            customer_email,
            customer_name,
            company: non_empty(body.company),
            message: non_empty(body.message),
            items: items
                .into_iter()
                .map(|line| QuoteItem {
                    product_id: line.product_id,
                    quantity: line.quantity,
                    quoted_unit_price: None,
                })
                .collect(),
        })
        .await?;

    info!(quote_id = %quote.quote.id, "Quote requested");
    Ok((StatusCode::CREATED, Json(quote)))
}

/// Show a quote requested on this tenant's storefront.
pub async fn show(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Path(id): Path<QuoteId>,
) -> Result<Json<QuoteDetail>> {
    let quote = QuoteRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("quote {id}")))?;
    ensure_same_tenant(quote.quote.distributor_id, tenant.distributor_id(), &format!("quote {id}"))?;

    Ok(Json(quote))
}
