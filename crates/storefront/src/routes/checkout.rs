//! Checkout and order lookup.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::{info, instrument};

use distrimart_core::OrderId;
use distrimart_core::pricing::{LineRequest, price_lines};

use super::{ensure_same_tenant, parse_customer, validate_lines};
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentTenant;
use crate::models::{NewOrder, OrderDetail};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub customer_email: String,
    pub customer_name: String,
    pub lines: Vec<LineRequest>,
    pub note: Option<String>,
}

/// Price the lines for the current tenant and store a pending order.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderDetail>)> {
    validate_lines(&request.lines)?;
    let (customer_email, customer_name) =
        parse_customer(&request.customer_email, &request.customer_name)?;

    let distributor_id = tenant.distributor_id();
    let cart = price_lines(state.pricing(), distributor_id, &request.lines).await?;

    let order = OrderRepository::new(state.pool())
        .create(&NewOrder {
            distributor_id,
            customer_email,
            customer_name,
            cart,
            quote_id: None,
            note: request.note.filter(|n| !n.trim().is_empty()),
        })
        .await?;

    info!(order_id = %order.order.id, subtotal = %order.order.subtotal, "Order placed");
    Ok((StatusCode::CREATED, Json(order)))
}

/// Show an order placed on this tenant's storefront.
pub async fn show(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    let what = format!("order {id}");

    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(what.clone()))?;
    ensure_same_tenant(order.order.distributor_id, tenant.distributor_id(), &what)?;

    Ok(Json(order))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::tests::{post_json, send};

    #[tokio::test]
    async fn test_invalid_email_is_rejected() {
        let body = json!({
            "customer_email": "nobody",
            "customer_name": "Pat",
            "lines": [{ "product_id": 1, "quantity": 2 }],
        });
        let response = send(post_json("/api/checkout", &body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_lines_field_is_rejected() {
        let body = json!({ "customer_email": "pat@acme.com", "customer_name": "Pat" });
        let response = send(post_json("/api/checkout", &body)).await;
        assert!(response.status().is_client_error());
    }
}
