//! Distributor (tenant) models as managed by the admin API.

use chrono::{DateTime, Utc};
use distrimart_core::tenant::Tenant;
use distrimart_core::{DiscountPercent, DistributorId, DomainId, DomainStatus};
use serde::{Deserialize, Serialize};

/// A distributor with its branding and default discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distributor {
    pub id: DistributorId,
    pub name: String,
    pub email_domain: String,
    pub logo_url: Option<String>,
    pub brand_color: Option<String>,
    pub default_discount: Option<DiscountPercent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Distributor> for Tenant {
    fn from(d: Distributor) -> Self {
        Self {
            id: d.id,
            name: d.name,
            email_domain: d.email_domain,
            logo_url: d.logo_url,
            brand_color: d.brand_color,
            default_discount: d.default_discount,
        }
    }
}

/// A custom domain claimed by a distributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DistributorDomain {
    pub id: DomainId,
    pub distributor_id: DistributorId,
    pub domain: String,
    pub status: DomainStatus,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
