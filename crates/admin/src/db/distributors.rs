//! Distributor and custom domain management.

use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;

use distrimart_core::{DiscountPercent, DistributorId, DomainId, DomainStatus};
use distrimart_storefront::db::distributors::{DISTRIBUTOR_COLUMNS, DistributorRow};
use distrimart_storefront::models::{Distributor, DistributorDomain};

use super::RepositoryError;

const DOMAIN_COLUMNS: &str = "id, distributor_id, domain, status, last_checked_at, created_at";

/// Validated values for a full distributor write.
#[derive(Debug, Clone)]
pub struct DistributorFields {
    pub name: String,
    pub email_domain: String,
    pub logo_url: Option<String>,
    pub brand_color: Option<String>,
    pub default_discount: Option<DiscountPercent>,
}

impl From<&Distributor> for DistributorFields {
    fn from(d: &Distributor) -> Self {
        Self {
            name: d.name.clone(),
            email_domain: d.email_domain.clone(),
            logo_url: d.logo_url.clone(),
            brand_color: d.brand_color.clone(),
            default_discount: d.default_discount,
        }
    }
}

/// Repository for distributors and their domains.
pub struct DistributorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DistributorRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All distributors by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Distributor>, RepositoryError> {
        let sql = format!("SELECT {DISTRIBUTOR_COLUMNS} FROM commerce.distributor d ORDER BY d.name, d.id");
        sqlx::query_as::<_, DistributorRow>(&sql)
            .fetch_all(self.pool)
            .await?
            .into_iter()
            .map(Distributor::try_from)
            .collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: DistributorId) -> Result<Option<Distributor>, RepositoryError> {
        let sql = format!("SELECT {DISTRIBUTOR_COLUMNS} FROM commerce.distributor d WHERE d.id = $1");
        sqlx::query_as::<_, DistributorRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .map(Distributor::try_from)
            .transpose()
    }

    /// Insert a distributor.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email domain is taken.
    #[instrument(skip(self, fields), fields(name = %fields.name))]
    pub async fn create(&self, fields: &DistributorFields) -> Result<Distributor, RepositoryError> {
        let sql = format!(
            "INSERT INTO commerce.distributor AS d \
                 (name, email_domain, logo_url, brand_color, default_discount_percent) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {DISTRIBUTOR_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DistributorRow>(&sql)
            .bind(&fields.name)
            .bind(&fields.email_domain)
            .bind(fields.logo_url.as_deref())
            .bind(fields.brand_color.as_deref())
            .bind(fields.default_discount.map(DiscountPercent::value))
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_unique(e, "email domain"))?;
        Distributor::try_from(row)
    }

    /// Overwrite every editable column.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown IDs and
    /// `RepositoryError::Conflict` if the email domain is taken.
    #[instrument(skip(self, fields))]
    pub async fn update(
        &self,
        id: DistributorId,
        fields: &DistributorFields,
    ) -> Result<Distributor, RepositoryError> {
        let sql = format!(
            "UPDATE commerce.distributor AS d \
             SET name = $2, email_domain = $3, logo_url = $4, brand_color = $5, \
                 default_discount_percent = $6, updated_at = NOW() \
             WHERE d.id = $1 \
             RETURNING {DISTRIBUTOR_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DistributorRow>(&sql)
            .bind(id)
            .bind(&fields.name)
            .bind(&fields.email_domain)
            .bind(fields.logo_url.as_deref())
            .bind(fields.brand_color.as_deref())
            .bind(fields.default_discount.map(DiscountPercent::value))
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RepositoryError::from_unique(e, "email domain"))?
            .ok_or(RepositoryError::NotFound)?;
        Distributor::try_from(row)
    }

    /// Delete a distributor. Domains and pricing rules cascade; orders and
    /// quotes keep their history with the distributor cleared.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown IDs.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: DistributorId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM commerce.distributor WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Domains claimed by a distributor.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn domains(&self, id: DistributorId) -> Result<Vec<DistributorDomain>, RepositoryError> {
        let sql = format!(
            "SELECT {DOMAIN_COLUMNS} FROM commerce.distributor_domain \
             WHERE distributor_id = $1 ORDER BY domain"
        );
        let domains = sqlx::query_as::<_, DistributorDomain>(&sql)
            .bind(id)
            .fetch_all(self.pool)
            .await?;
        Ok(domains)
    }

    /// Claim a domain for a distributor. New domains start `pending` and do
    /// not resolve until verified.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the domain is already claimed and
    /// `RepositoryError::NotFound` for unknown distributors.
    #[instrument(skip(self))]
    pub async fn add_domain(
        &self,
        id: DistributorId,
        domain: &str,
    ) -> Result<DistributorDomain, RepositoryError> {
        let sql = format!(
            "INSERT INTO commerce.distributor_domain (distributor_id, domain, status) \
             VALUES ($1, $2, $3) RETURNING {DOMAIN_COLUMNS}"
        );
        sqlx::query_as::<_, DistributorDomain>(&sql)
            .bind(id)
            .bind(domain)
            .bind(DomainStatus::Pending)
            .fetch_one(self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                    RepositoryError::NotFound
                }
                e => RepositoryError::from_unique(e, "domain"),
            })
    }

    /// Record the outcome of a domain verification check.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown domain IDs.
    #[instrument(skip(self))]
    pub async fn set_domain_status(
        &self,
        id: DomainId,
        status: DomainStatus,
    ) -> Result<DistributorDomain, RepositoryError> {
        let sql = format!(
            "UPDATE commerce.distributor_domain SET status = $2, last_checked_at = $3 \
             WHERE id = $1 RETURNING {DOMAIN_COLUMNS}"
        );
        sqlx::query_as::<_, DistributorDomain>(&sql)
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}
