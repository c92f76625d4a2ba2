//! Catalog route handlers.
//!
//! Every listed product carries its effective unit price for the current
//! tenant.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use distrimart_core::ProductId;
use distrimart_core::pricing::{MAX_LINE_QUANTITY, ResolvedPrice, price_product};

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentTenant;
use crate::models::{Category, Product};
use crate::state::AppState;

/// A product with its resolved price.
#[derive(Debug, Serialize)]
pub struct PricedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub price: ResolvedPrice,
}

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuantityQuery {
    pub quantity: Option<u32>,
}

/// List categories.
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CatalogRepository::new(state.pool()).list_categories().await?;
    Ok(Json(categories))
}

/// List active products priced at quantity 1.
#[instrument(skip(state, tenant))]
pub async fn index(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<Vec<PricedProduct>>> {
    let products = CatalogRepository::new(state.pool())
        .list_products(query.category.as_deref())
        .await?;

    let distributor = tenant.distributor_id();
    let mut priced = Vec::with_capacity(products.len());
    for product in products {
        let price = price_product(state.pricing(), &product.pricing(), distributor, 1).await;
        priced.push(PricedProduct { product, price });
    }

    Ok(Json(priced))
}

/// Show one product priced for `?quantity=` (default 1).
#[instrument(skip(state, tenant))]
pub async fn show(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Path(id): Path<ProductId>,
    Query(query): Query<QuantityQuery>,
) -> Result<Json<PricedProduct>> {
    let quantity = query.quantity.unwrap_or(1);
    if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
        return Err(AppError::BadRequest(format!(
            "quantity must be between 1 and {MAX_LINE_QUANTITY}"
        )));
    }

    let product = CatalogRepository::new(state.pool())
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let price = price_product(state.pricing(), &product.pricing(), tenant.distributor_id(), quantity).await;

    Ok(Json(PricedProduct { product, price }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    use crate::routes::tests::send;

    #[tokio::test]
    async fn test_zero_quantity_is_rejected() {
        let response = send(
            Request::builder()
                .uri("/api/products/1?quantity=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_quantity_above_limit_is_rejected() {
        let response = send(
            Request::builder()
                .uri("/api/products/1?quantity=1000001")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_rejected() {
        let response = send(
            Request::builder()
                .uri("/api/products/widget")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
