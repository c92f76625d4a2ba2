//! Current tenant branding.

use axum::Json;

use distrimart_core::tenant::ResolvedTenant;

use crate::middleware::CurrentTenant;

/// The tenant resolved from the request host, or `null`.
pub async fn show(CurrentTenant(tenant): CurrentTenant) -> Json<Option<ResolvedTenant>> {
    Json(tenant)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    use crate::routes::tests::{json_body, send};

    #[tokio::test]
    async fn test_no_host_means_no_tenant() {
        let response = send(Request::builder().uri("/api/tenant").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(json_body(response).await.is_null());
    }
}
