//! Cart pricing.

use axum::{Json, extract::State};
use serde::Deserialize;

use distrimart_core::pricing::{LineRequest, PricedCart, price_lines};

use super::validate_lines;
use crate::error::Result;
use crate::middleware::CurrentTenant;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CartRequest {
    pub lines: Vec<LineRequest>,
}

/// Price cart lines for the current tenant. Nothing is persisted.
pub async fn price(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Json(request): Json<CartRequest>,
) -> Result<Json<PricedCart>> {
    validate_lines(&request.lines)?;
    let cart = price_lines(state.pricing(), tenant.distributor_id(), &request.lines).await?;
    Ok(Json(cart))
}
