//! Order management.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::info;

use distrimart_core::{OrderId, OrderStatus};
use distrimart_storefront::models::{Order, OrderDetail};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<OrderStatus>,
}

/// List orders, newest first.
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(OrderRepository::new(state.pool()).list(filter.status).await?))
}

/// Order with items and status history.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
    #[serde(default)]
    pub note: Option<String>,
}

/// Move an order along its workflow. Disallowed transitions are `409`.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<OrderDetail>> {
    let note = body.note.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let order = OrderRepository::new(state.pool())
        .update_status(id, body.status, note)
        .await?;

    info!(order_id = %id, status = %body.status, "Order status updated");
    state.stats().invalidate_and_maybe_warm().await;

    Ok(Json(order))
}
