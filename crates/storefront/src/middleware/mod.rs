//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with `request_id` and `tenant_id` fields)
//! 3. Request ID (reuse or generate `x-request-id`)
//! 4. Tenant (resolve `Host` into [`CurrentTenant`])

pub mod request_id;
pub mod tenant;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use tenant::{CurrentTenant, tenant_middleware};
