//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                   - Liveness check
//! GET    /health/ready                             - Readiness check
//!
//! # Dashboard
//! GET    /api/stats                                - Cached store statistics
//!
//! # Distributors
//! GET    /api/distributors                         - List
//! POST   /api/distributors                         - Create
//! GET    /api/distributors/{id}                    - Detail with domains
//! PATCH  /api/distributors/{id}                    - Update branding / discount
//! DELETE /api/distributors/{id}                    - Delete
//! POST   /api/distributors/{id}/domains            - Claim a custom domain
//! PUT    /api/domains/{id}/status                  - Record verification result
//!
//! # Pricing rules
//! PUT    /api/distributors/{id}/prices/{product}   - Upsert custom price + tiers
//! DELETE /api/distributors/{id}/prices/{product}
//! PUT    /api/distributors/{id}/category-discounts/{category}
//! DELETE /api/distributors/{id}/category-discounts/{category}
//!
//! # Orders and quotes
//! GET    /api/orders?status=                       - List
//! GET    /api/orders/{id}                          - Detail with history
//! PUT    /api/orders/{id}/status                   - Transition
//! GET    /api/quotes?status=                       - List
//! GET    /api/quotes/{id}                          - Detail
//! PUT    /api/quotes/{id}/status                   - Record quoting decision
//! POST   /api/quotes/{id}/convert                  - Convert to order
//! ```
//!
//! The admin API has no login of its own; bind it to a private interface.

pub mod distributors;
pub mod orders;
pub mod pricing;
pub mod quotes;
pub mod stats;

use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::{Request, Response, StatusCode},
    middleware::from_fn,
    routing::{get, post, put},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use distrimart_storefront::middleware::request_id_middleware;

use crate::state::AppState;

/// Create the API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/stats", get(stats::show))
        .route(
            "/api/distributors",
            get(distributors::index).post(distributors::create),
        )
        .route(
            "/api/distributors/{id}",
            get(distributors::show)
                .patch(distributors::update)
                .delete(distributors::delete),
        )
        .route("/api/distributors/{id}/domains", post(distributors::add_domain))
        .route("/api/domains/{id}/status", put(distributors::set_domain_status))
        .route(
            "/api/distributors/{id}/prices/{product}",
            put(pricing::upsert_price).delete(pricing::delete_price),
        )
        .route(
            "/api/distributors/{id}/category-discounts/{category}",
            put(pricing::upsert_category_discount).delete(pricing::delete_category_discount),
        )
        .route("/api/orders", get(orders::index))
        .route("/api/orders/{id}", get(orders::show))
        .route("/api/orders/{id}/status", put(orders::update_status))
        .route("/api/quotes", get(quotes::index))
        .route("/api/quotes/{id}", get(quotes::show))
        .route("/api/quotes/{id}/status", put(quotes::update_status))
        .route("/api/quotes/{id}/convert", post(quotes::convert))
}

/// Build the full application with health checks and tracing.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
