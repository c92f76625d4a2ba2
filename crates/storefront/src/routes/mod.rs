//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (database ping)
//!
//! GET  /api/tenant                  - Current tenant branding (or null)
//! GET  /api/categories              - Category listing
//! GET  /api/products?category=      - Active products with effective prices
//! GET  /api/products/{id}?quantity= - One product priced for a quantity
//! POST /api/cart/price              - Price cart lines
//! POST /api/checkout                - Create a pending order
//! GET  /api/orders/{id}             - Order with items and history
//! POST /api/quotes                  - Request a quote
//! GET  /api/quotes/{id}             - Quote request
//! ```

pub mod cart;
pub mod checkout;
pub mod products;
pub mod quotes;
pub mod tenant;

use axum::{
    Router,
    extract::State,
    http::{Request, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use distrimart_core::pricing::{LineRequest, MAX_LINE_QUANTITY, merge_lines};
use distrimart_core::{DistributorId, Email};

use crate::error::AppError;
use crate::middleware::{request_id_middleware, tenant_middleware};
use crate::state::AppState;

/// Create the API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tenant", get(tenant::show))
        .route("/api/categories", get(products::categories))
        .route("/api/products", get(products::index))
        .route("/api/products/{id}", get(products::show))
        .route("/api/cart/price", post(cart::price))
        .route("/api/checkout", post(checkout::create))
        .route("/api/orders/{id}", get(checkout::show))
        .route("/api/quotes", post(quotes::create))
        .route("/api/quotes/{id}", get(quotes::show))
}

/// Build the full application with health checks and the middleware stack.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .layer(from_fn_with_state(state.clone(), tenant_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
                tenant_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Reject empty line lists and quantities outside `1..=MAX_LINE_QUANTITY`,
/// counting duplicate lines for a product together.
pub(crate) fn validate_lines(lines: &[LineRequest]) -> Result<(), AppError> {
    if lines.is_empty() {
        return Err(AppError::BadRequest("at least one line is required".to_owned()));
    }
    if let Some(line) = lines.iter().find(|l| l.quantity == 0) {
        return Err(AppError::BadRequest(format!(
            "quantity for product {} must be at least 1",
            line.product_id
        )));
    }
    if let Some(line) = merge_lines(lines)
        .iter()
        .find(|l| l.quantity > MAX_LINE_QUANTITY)
    {
        return Err(AppError::BadRequest(format!(
            "quantity for product {} cannot exceed {MAX_LINE_QUANTITY}",
            line.product_id
        )));
    }
    Ok(())
}

/// Validate customer contact fields.
pub(crate) fn parse_customer(email: &str, name: &str) -> Result<(Email, String), AppError> {
    let email = Email::parse(email)
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("customer name is required".to_owned()));
    }
    Ok((email, name.to_owned()))
}

/// Records are only visible on the storefront of the tenant they belong to.
pub(crate) fn ensure_same_tenant(
    owner: Option<DistributorId>,
    current: Option<DistributorId>,
    what: &str,
) -> Result<(), AppError> {
    if owner == current {
        Ok(())
    } else {
        Err(AppError::NotFound(what.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use axum::body::Body;
    use axum::response::Response;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{SentryConfig, StorefrontConfig};

    /// App over a pool that never connects. Requests without a `Host` header
    /// skip tenant resolution, so validation paths run without a database.
    pub fn test_app() -> Router {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/distrimart_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            dev_suffix: "localhost".to_owned(),
            sentry: SentryConfig::default(),
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/distrimart_test")
            .unwrap();
        app(AppState::new(config, pool))
    }

    pub async fn send(request: axum::http::Request<Body>) -> Response {
        test_app().oneshot(request).await.unwrap()
    }

    pub fn post_json(uri: &str, body: &serde_json::Value) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(
            axum::http::Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[test]
    fn test_validate_lines() {
        let line = |quantity| LineRequest {
            product_id: distrimart_core::ProductId::new(1),
            quantity,
        };
        assert!(validate_lines(&[line(1), line(5)]).is_ok());
        assert!(matches!(validate_lines(&[]), Err(AppError::BadRequest(_))));
        assert!(matches!(
            validate_lines(&[line(1), line(0)]),
            Err(AppError::BadRequest(_))
        ));
        assert!(validate_lines(&[line(MAX_LINE_QUANTITY)]).is_ok());
        assert!(matches!(
            validate_lines(&[line(MAX_LINE_QUANTITY + 1)]),
            Err(AppError::BadRequest(_))
        ));
        // Duplicates are capped on their combined quantity, without wrapping.
        assert!(matches!(
            validate_lines(&[line(MAX_LINE_QUANTITY), line(1)]),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            validate_lines(&[line(u32::MAX), line(u32::MAX)]),
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_checkout_quantity_above_limit_is_bad_request() {
        let body = serde_json::json!({
            "customer_email": "pat@acme.com",
            "customer_name": "Pat",
            "lines": [{ "product_id": 1, "quantity": 3_000_000_000_u32 }],
        });
        let response = send(post_json("/api/checkout", &body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("cannot exceed"));
    }

    #[test]
    fn test_parse_customer() {
        let (email, name) = parse_customer(" buyer@Acme.com ", "  Pat Buyer ").unwrap();
        assert_eq!(email.as_str(), "buyer@acme.com");
        assert_eq!(name, "Pat Buyer");
        assert!(parse_customer("not-an-email", "Pat").is_err());
        assert!(parse_customer("buyer@acme.com", "   ").is_err());
    }

    #[test]
    fn test_ensure_same_tenant() {
        let acme = Some(DistributorId::new(1));
        assert!(ensure_same_tenant(acme, acme, "order").is_ok());
        assert!(ensure_same_tenant(None, None, "order").is_ok());
        assert!(ensure_same_tenant(acme, None, "order").is_err());
        assert!(ensure_same_tenant(None, acme, "order").is_err());
    }
}
