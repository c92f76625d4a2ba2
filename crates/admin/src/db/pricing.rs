//! Per-distributor pricing rules.

use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use distrimart_core::pricing::{DistributorPrice, TierSchedule};
use distrimart_core::{CategoryId, DiscountPercent, DistributorId, ProductId};

use super::RepositoryError;
use crate::models::{CategoryDiscount, PriceRule};

/// Unknown distributor, product or category references are reported as
/// `NotFound`.
fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db) = e
        && db.is_foreign_key_violation()
    {
        return RepositoryError::NotFound;
    }
    RepositoryError::Database(e)
}

fn deleted(rows: u64) -> Result<(), RepositoryError> {
    if rows == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

/// Repository for distributor prices and category discounts.
pub struct PricingRuleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PricingRuleRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create or replace a distributor's price for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the distributor or product does
    /// not exist.
    #[instrument(skip(self, rule))]
    pub async fn upsert_price(
        &self,
        distributor: DistributorId,
        product: ProductId,
        rule: &PriceRule,
    ) -> Result<DistributorPrice, RepositoryError> {
        let (custom_price, tiers): (Decimal, Json<TierSchedule>) = sqlx::query_as(
            r"
            INSERT INTO commerce.distributor_price (product_id, distributor_id, custom_price, tiers)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (product_id, distributor_id)
            DO UPDATE SET custom_price = $3, tiers = $4, updated_at = NOW()
            RETURNING custom_price, tiers
            ",
        )
        .bind(product)
        .bind(distributor)
        .bind(rule.custom_price)
        .bind(Json(&rule.tiers))
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(DistributorPrice {
            product_id: product,
            distributor_id: distributor,
            custom_price,
            tiers: tiers.0,
        })
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such price exists.
    pub async fn delete_price(
        &self,
        distributor: DistributorId,
        product: ProductId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM commerce.distributor_price WHERE product_id = $1 AND distributor_id = $2",
        )
        .bind(product)
        .bind(distributor)
        .execute(self.pool)
        .await?;
        deleted(result.rows_affected())
    }

    /// Create or replace a category discount.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the distributor or category does
    /// not exist.
    #[instrument(skip(self))]
    pub async fn upsert_category_discount(
        &self,
        distributor: DistributorId,
        category: CategoryId,
        percent: DiscountPercent,
    ) -> Result<CategoryDiscount, RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO commerce.category_discount (distributor_id, category_id, discount_percent)
            VALUES ($1, $2, $3)
            ON CONFLICT (distributor_id, category_id)
            DO UPDATE SET discount_percent = $3, updated_at = NOW()
            ",
        )
        .bind(distributor)
        .bind(category)
        .bind(percent.value())
        .execute(self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(CategoryDiscount {
            distributor_id: distributor,
            category_id: category,
            discount_percent: percent,
        })
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such discount exists.
    pub async fn delete_category_discount(
        &self,
        distributor: DistributorId,
        category: CategoryId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM commerce.category_discount WHERE distributor_id = $1 AND category_id = $2",
        )
        .bind(distributor)
        .bind(category)
        .execute(self.pool)
        .await?;
        deleted(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deleted_reports_missing_rows() {
        assert!(deleted(1).is_ok());
        assert!(matches!(deleted(0), Err(RepositoryError::NotFound)));
    }

    #[test]
    fn test_plain_errors_stay_database_errors() {
        assert!(matches!(
            map_write_error(sqlx::Error::RowNotFound),
            RepositoryError::Database(_)
        ));
    }
}
