//! Tenant lookups backing host-based resolution.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use distrimart_core::tenant::{Tenant, TenantDirectory};
use distrimart_core::{DiscountPercent, DistributorId};

use super::RepositoryError;
use crate::models::Distributor;

/// Columns selected for every distributor query.
pub const DISTRIBUTOR_COLUMNS: &str = "d.id, d.name, d.email_domain, d.logo_url, d.brand_color, \
     d.default_discount_percent, d.created_at, d.updated_at";

/// Raw `commerce.distributor` row.
#[derive(Debug, sqlx::FromRow)]
pub struct DistributorRow {
    pub id: DistributorId,
    pub name: String,
    pub email_domain: String,
    pub logo_url: Option<String>,
    pub brand_color: Option<String>,
    pub default_discount_percent: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DistributorRow> for Distributor {
    type Error = RepositoryError;

    fn try_from(row: DistributorRow) -> Result<Self, Self::Error> {
        let default_discount = row
            .default_discount_percent
            .map(DiscountPercent::new)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("distributor {}: {e}", row.id))
            })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            email_domain: row.email_domain,
            logo_url: row.logo_url,
            brand_color: row.brand_color,
            default_discount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn to_tenant(row: Option<DistributorRow>) -> Result<Option<Tenant>, RepositoryError> {
    row.map(|r| Distributor::try_from(r).map(Tenant::from))
        .transpose()
}

/// [`TenantDirectory`] over the `commerce` schema.
///
/// Holds its own pool handle so it can live in shared application state.
#[derive(Clone)]
pub struct PgTenantDirectory {
    pool: PgPool,
}

impl PgTenantDirectory {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TenantDirectory for PgTenantDirectory {
    type Error = RepositoryError;

    async fn find_by_email_domain(&self, hosts: &[String]) -> Result<Option<Tenant>, Self::Error> {
        let sql = format!(
            "SELECT {DISTRIBUTOR_COLUMNS} FROM commerce.distributor d \
             WHERE lower(d.email_domain) = ANY($1) ORDER BY d.id LIMIT 1"
        );
        let row = sqlx::query_as::<_, DistributorRow>(&sql)
            .bind(hosts)
            .fetch_optional(&self.pool)
            .await?;
        to_tenant(row)
    }

    async fn find_by_name_key(&self, key: &str) -> Result<Option<Tenant>, Self::Error> {
        let sql = format!(
            "SELECT {DISTRIBUTOR_COLUMNS} FROM commerce.distributor d \
             WHERE regexp_replace(lower(d.name), '[^a-z0-9]', '', 'g') = $1 \
             ORDER BY d.id LIMIT 1"
        );
        let row = sqlx::query_as::<_, DistributorRow>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        to_tenant(row)
    }

    async fn find_by_verified_domain(&self, hosts: &[String]) -> Result<Option<Tenant>, Self::Error> {
        let sql = format!(
            "SELECT {DISTRIBUTOR_COLUMNS} FROM commerce.distributor d \
             JOIN commerce.distributor_domain dd ON dd.distributor_id = d.id \
             WHERE dd.status = 'verified' AND lower(dd.domain) = ANY($1) \
             ORDER BY d.id LIMIT 1"
        );
        let row = sqlx::query_as::<_, DistributorRow>(&sql)
            .bind(hosts)
            .fetch_optional(&self.pool)
            .await?;
        to_tenant(row)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(discount: Option<&str>) -> DistributorRow {
        DistributorRow {
            id: DistributorId::new(7),
            name: "Acme Supply".to_owned(),
            email_domain: "acme.com".to_owned(),
            logo_url: None,
            brand_color: Some("#ff6600".to_owned()),
            default_discount_percent: discount.map(|s| s.parse().unwrap()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_converts_to_tenant() {
        let tenant = to_tenant(Some(row(Some("12.5")))).unwrap().unwrap();
        assert_eq!(tenant.id, DistributorId::new(7));
        assert_eq!(
            tenant.default_discount.map(DiscountPercent::value),
            Some("12.5".parse().unwrap())
        );
    }

    #[test]
    fn test_out_of_range_discount_is_corruption() {
        let err = to_tenant(Some(row(Some("150")))).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
