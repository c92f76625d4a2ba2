//! Tenant resolution from the request `Host` header.
//!
//! A request belongs to a distributor when its host matches, in order:
//!
//! 1. the distributor's registered email domain (with or without `www.`)
//! 2. a subdomain label that fuzzily matches the distributor's name
//!    (`acme-supplies.shop.example` or `acme.localhost` in development)
//! 3. a custom domain whose verification status is `verified`
//!
//! Resolution never fails: a lookup error is logged and the step is skipped,
//! and an unresolved host simply means "no tenant" (base pricing).

use std::future::Future;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{DiscountPercent, DistributorId};

/// Default suffix for local development hosts (`acme.localhost`).
pub const DEFAULT_DEV_SUFFIX: &str = "localhost";

/// A distributor identity with the branding the storefront needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: DistributorId,
    pub name: String,
    pub email_domain: String,
    pub logo_url: Option<String>,
    pub brand_color: Option<String>,
    pub default_discount: Option<DiscountPercent>,
}

/// Which rule identified the tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantMatch {
    EmailDomain,
    Subdomain,
    CustomDomain,
}

/// A tenant together with the rule that matched it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTenant {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub matched_by: TenantMatch,
}

/// Lookup operations the resolver needs from persistent storage.
///
/// `hosts` arguments always contain the bare host and its `www.` form, both
/// already normalized.
pub trait TenantDirectory: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Find the distributor whose email domain equals one of `hosts`.
    fn find_by_email_domain(
        &self,
        hosts: &[String],
    ) -> impl Future<Output = Result<Option<Tenant>, Self::Error>> + Send;

    /// Find the lowest-id distributor whose [`name_key`] equals `key`.
    fn find_by_name_key(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Tenant>, Self::Error>> + Send;

    /// Find the distributor owning a *verified* custom domain in `hosts`.
    fn find_by_verified_domain(
        &self,
        hosts: &[String],
    ) -> impl Future<Output = Result<Option<Tenant>, Self::Error>> + Send;
}

/// Normalize a raw `Host` header value.
///
/// Strips the port (including bracketed IPv6 forms) and a trailing dot, then
/// lowercases. Returns `None` for empty or malformed input.
///
/// ```
/// use distrimart_core::tenant::normalize_host;
///
/// assert_eq!(normalize_host("Example.COM:3000").as_deref(), Some("example.com"));
/// assert_eq!(normalize_host("[::1]:8080").as_deref(), Some("::1"));
/// assert_eq!(normalize_host("  "), None);
/// ```
#[must_use]
pub fn normalize_host(raw: &str) -> Option<String> {
    let trimmed = raw.trim();

    let host = if let Some(rest) = trimmed.strip_prefix('[') {
        rest.split_once(']').map(|(inner, _)| inner)?
    } else if trimmed.matches(':').count() == 1 {
        trimmed.split_once(':').map_or(trimmed, |(host, _)| host)
    } else {
        trimmed
    };

    let host = host.strip_suffix('.').unwrap_or(host);
    if host.is_empty()
        || !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | ':' | '_'))
    {
        return None;
    }

    Some(host.to_ascii_lowercase())
}

/// Remove a single leading `www.`.
#[must_use]
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// The bare host and its `www.` form.
#[must_use]
pub fn host_variants(host: &str) -> [String; 2] {
    let bare = strip_www(host);
    [bare.to_owned(), format!("www.{bare}")]
}

/// Extract the tenant label from a subdomain-style host.
///
/// Hosts with at least three labels yield their first label (a leading `www`
/// is skipped). Development hosts of the form `<label>.<dev_suffix>` yield
/// `<label>`. IP addresses never yield a label.
///
/// ```
/// use distrimart_core::tenant::subdomain_label;
///
/// assert_eq!(subdomain_label("acme.shop.example", "localhost"), Some("acme"));
/// assert_eq!(subdomain_label("www.acme.shop.example", "localhost"), Some("acme"));
/// assert_eq!(subdomain_label("acme.localhost", "localhost"), Some("acme"));
/// assert_eq!(subdomain_label("acme.com", "localhost"), None);
/// ```
#[must_use]
pub fn subdomain_label<'a>(host: &'a str, dev_suffix: &str) -> Option<&'a str> {
    if host.parse::<IpAddr>().is_ok() {
        return None;
    }

    if !dev_suffix.is_empty()
        && let Some(label) = host
            .strip_suffix(dev_suffix)
            .and_then(|rest| rest.strip_suffix('.'))
        && !label.is_empty()
        && !label.contains('.')
    {
        return (label != "www").then_some(label);
    }

    let label_count = host.split('.').count();
    let mut labels = host.split('.');
    let first = labels.next()?;
    if first == "www" {
        return if label_count >= 4 {
            labels.next().filter(|l| !l.is_empty())
        } else {
            None
        };
    }

    (label_count >= 3 && !first.is_empty()).then_some(first)
}

/// Reduce a distributor name or host label to lowercase ASCII alphanumerics.
///
/// `"Acme Supplies, Inc."`, `acme-supplies-inc` and `acmesuppliesinc` all
/// share the key `acmesuppliesinc`.
#[must_use]
pub fn name_key(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Resolves request hosts to tenants using a [`TenantDirectory`].
#[derive(Debug, Clone)]
pub struct TenantResolver<D> {
    directory: D,
    dev_suffix: String,
}

impl<D: TenantDirectory> TenantResolver<D> {
    /// Create a resolver with the given development host suffix.
    pub fn new(directory: D, dev_suffix: impl Into<String>) -> Self {
        Self {
            directory,
            dev_suffix: dev_suffix.into(),
        }
    }

    /// Resolve a raw `Host` header value to a tenant.
    pub async fn resolve(&self, raw_host: &str) -> Option<ResolvedTenant> {
        let host = normalize_host(raw_host)?;
        let variants = host_variants(&host);

        match self.directory.find_by_email_domain(&variants).await {
            Ok(Some(tenant)) => return Some(matched(tenant, TenantMatch::EmailDomain)),
            Ok(None) => {}
            Err(e) => warn!(host = %host, error = %e, "Email domain lookup failed"),
        }

        if let Some(label) = subdomain_label(&host, &self.dev_suffix) {
            let key = name_key(label);
            if !key.is_empty() {
                match self.directory.find_by_name_key(&key).await {
                    Ok(Some(tenant)) => return Some(matched(tenant, TenantMatch::Subdomain)),
                    Ok(None) => {}
                    Err(e) => warn!(host = %host, label, error = %e, "Subdomain lookup failed"),
                }
            }
        }

        match self.directory.find_by_verified_domain(&variants).await {
            Ok(Some(tenant)) => return Some(matched(tenant, TenantMatch::CustomDomain)),
            Ok(None) => {}
            Err(e) => warn!(host = %host, error = %e, "Custom domain lookup failed"),
        }

        debug!(host = %host, "No tenant for host");
        None
    }
}

fn matched(tenant: Tenant, matched_by: TenantMatch) -> ResolvedTenant {
    debug!(tenant_id = %tenant.id, ?matched_by, "Tenant resolved");
    ResolvedTenant { tenant, matched_by }
}
