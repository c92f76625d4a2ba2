//! Tenant resolution middleware and extractor.
//!
//! Resolves the `Host` header once per request and stores the result in
//! request extensions. Handlers read it back with [`CurrentTenant`].

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::HOST, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::Span;

use distrimart_core::DistributorId;
use distrimart_core::tenant::ResolvedTenant;

use crate::state::AppState;

/// The tenant the current request belongs to, if any.
///
/// Missing or unresolvable hosts yield `None`; base pricing then applies.
#[derive(Debug, Clone, Default)]
pub struct CurrentTenant(pub Option<ResolvedTenant>);

impl CurrentTenant {
    /// The tenant's distributor ID for pricing lookups.
    #[must_use]
    pub fn distributor_id(&self) -> Option<DistributorId> {
        self.0.as_ref().map(|t| t.tenant.id)
    }
}

impl<S> FromRequestParts<S> for CurrentTenant
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Self>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Middleware that resolves the request host to a tenant.
pub async fn tenant_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    let resolved = match host {
        Some(host) => state.tenants().resolve(&host).await,
        None => None,
    };

    if let Some(resolved) = &resolved {
        let id = resolved.tenant.id.to_string();
        Span::current().record("tenant_id", id.as_str());
        sentry::configure_scope(|scope| {
            scope.set_tag("tenant_id", &id);
        });
    }

    request.extensions_mut().insert(CurrentTenant(resolved));
    next.run(request).await
}
