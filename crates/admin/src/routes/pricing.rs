//! Per-distributor pricing rules.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

use distrimart_core::pricing::DistributorPrice;
use distrimart_core::{CategoryId, DiscountPercent, DistributorId, ProductId, check_money};

use crate::db::PricingRuleRepository;
use crate::error::{AppError, Result};
use crate::models::{CategoryDiscount, PriceRule};
use crate::state::AppState;

fn validate_rule(rule: &PriceRule) -> Result<()> {
    check_money(rule.custom_price)
        .map_err(|e| AppError::BadRequest(format!("custom price: {e}")))?;
    Ok(())
}

/// Create or replace a custom price with optional quantity tiers.
pub async fn upsert_price(
    State(state): State<AppState>,
    Path((distributor, product)): Path<(DistributorId, ProductId)>,
    Json(rule): Json<PriceRule>,
) -> Result<Json<DistributorPrice>> {
    validate_rule(&rule)?;
    let price = PricingRuleRepository::new(state.pool())
        .upsert_price(distributor, product, &rule)
        .await?;

    info!(
        distributor_id = %distributor,
        product_id = %product,
        tiers = price.tiers.tiers().len(),
        "Distributor price saved"
    );
    Ok(Json(price))
}

pub async fn delete_price(
    State(state): State<AppState>,
    Path((distributor, product)): Path<(DistributorId, ProductId)>,
) -> Result<StatusCode> {
    PricingRuleRepository::new(state.pool())
        .delete_price(distributor, product)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct CategoryDiscountBody {
    pub discount_percent: DiscountPercent,
}

/// Create or replace a category discount.
pub async fn upsert_category_discount(
    State(state): State<AppState>,
    Path((distributor, category)): Path<(DistributorId, CategoryId)>,
    Json(body): Json<CategoryDiscountBody>,
) -> Result<Json<CategoryDiscount>> {
    let discount = PricingRuleRepository::new(state.pool())
        .upsert_category_discount(distributor, category, body.discount_percent)
        .await?;
    Ok(Json(discount))
}

pub async fn delete_category_discount(
    State(state): State<AppState>,
    Path((distributor, category)): Path<(DistributorId, CategoryId)>,
) -> Result<StatusCode> {
    PricingRuleRepository::new(state.pool())
        .delete_category_discount(distributor, category)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
