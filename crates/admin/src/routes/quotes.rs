//! Quote request management and conversion.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

use distrimart_core::{QuoteId, QuoteStatus, check_money};
use distrimart_storefront::models::{OrderDetail, Quote, QuoteDetail, QuotedPrice};

use crate::db::QuoteRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<QuoteStatus>,
}

/// List quote requests, newest first.
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<Vec<Quote>>> {
    Ok(Json(QuoteRepository::new(state.pool()).list(filter.status).await?))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<QuoteId>,
) -> Result<Json<QuoteDetail>> {
    let quote = QuoteRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("quote {id}")))?;
    Ok(Json(quote))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: QuoteStatus,
    /// Agreed unit prices, only accepted when moving to `quoted`.
    #[serde(default)]
    pub items: Vec<QuotedPrice>,
}

fn validate_update(id: QuoteId, body: &StatusUpdate) -> Result<()> {
    if body.status == QuoteStatus::Converted {
        return Err(AppError::BadRequest(format!(
            "use POST /api/quotes/{id}/convert to convert a quote"
        )));
    }
    if !body.items.is_empty() && body.status != QuoteStatus::Quoted {
        return Err(AppError::BadRequest(
            "item prices can only be set when moving a quote to quoted".to_owned(),
        ));
    }
    for item in &body.items {
        check_money(item.quoted_unit_price).map_err(|e| {
            AppError::BadRequest(format!("quoted price for product {}: {e}", item.product_id))
        })?;
    }
    Ok(())
}

/// Record a quoting decision, optionally with agreed unit prices per item.
/// Conversion has its own endpoint.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<QuoteId>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<QuoteDetail>> {
    validate_update(id, &body)?;

    let quote = QuoteRepository::new(state.pool())
        .update_status(id, body.status, &body.items)
        .await?;

    info!(quote_id = %id, status = %body.status, prices = body.items.len(), "Quote status updated");
    state.stats().invalidate_and_maybe_warm().await;

    Ok(Json(quote))
}

#[derive(Debug, Default, Deserialize)]
pub struct ConvertBody {
    #[serde(default)]
    pub note: Option<String>,
}

/// Convert a quote into a pending order.
pub async fn convert(
    State(state): State<AppState>,
    Path(id): Path<QuoteId>,
    body: Option<Json<ConvertBody>>,
) -> Result<(StatusCode, Json<OrderDetail>)> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let note = body.note.as_deref().map(str::trim).filter(|n| !n.is_empty());

    let order = QuoteRepository::new(state.pool())
        .convert(id, state.pricing(), note)
        .await?;

    state.stats().invalidate_and_maybe_warm().await;
    Ok((StatusCode::CREATED, Json(order)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::tests::{json_request, send};

    #[tokio::test]
    async fn test_prices_only_accepted_when_quoting() {
        let body = json!({
            "status": "rejected",
            "items": [{ "product_id": 1, "quoted_unit_price": "9.50" }],
        });
        let response = send(json_request("PUT", "/api/quotes/1/status", &body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_quoted_prices_must_fit_money_column() {
        for price in ["4.555", "-1.00", "10000000000.00"] {
            let body = json!({
                "status": "quoted",
                "items": [{ "product_id": 1, "quoted_unit_price": price }],
            });
            let response = send(json_request("PUT", "/api/quotes/1/status", &body)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{price}");
        }
    }

    #[tokio::test]
    async fn test_converted_status_requires_convert_endpoint() {
        let body = json!({ "status": "converted" });
        let response = send(json_request("PUT", "/api/quotes/1/status", &body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
