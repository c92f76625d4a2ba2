//! Catalog queries and the Postgres-backed pricing source.

use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use distrimart_core::pricing::{DistributorPrice, PricingSource, ProductPricing, TierSchedule};
use distrimart_core::{CategoryId, DiscountPercent, DistributorId, ProductId};

use super::RepositoryError;
use crate::models::{Category, Product};

/// Repository for catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, slug FROM commerce.category ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(categories)
    }

    /// Active products, optionally restricted to one category slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(
        &self,
        category_slug: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT p.id, p.sku, p.name, p.description, p.base_price, p.category_id
            FROM commerce.product p
            LEFT JOIN commerce.category c ON c.id = p.category_id
            WHERE p.active AND ($1::TEXT IS NULL OR c.slug = $1)
            ORDER BY p.name, p.id
            ",
        )
        .bind(category_slug)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// An active product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT id, sku, name, description, base_price, category_id
            FROM commerce.product
            WHERE id = $1 AND active
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }
}

#[derive(sqlx::FromRow)]
struct DistributorPriceRow {
    product_id: ProductId,
    distributor_id: DistributorId,
    custom_price: Decimal,
    tiers: Json<TierSchedule>,
}

fn percent(value: Option<Decimal>, what: &str) -> Result<Option<DiscountPercent>, RepositoryError> {
    value
        .map(DiscountPercent::new)
        .transpose()
        .map_err(|e| RepositoryError::DataCorruption(format!("{what}: {e}")))
}

/// [`PricingSource`] reading products and per-tenant rules from Postgres.
#[derive(Clone)]
pub struct PgPricingSource {
    pool: PgPool,
}

impl PgPricingSource {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl PricingSource for PgPricingSource {
    type Error = RepositoryError;

    async fn product(&self, id: ProductId) -> Result<Option<ProductPricing>, Self::Error> {
        let product = CatalogRepository::new(&self.pool).get_product(id).await?;
        Ok(product.as_ref().map(Product::pricing))
    }

    async fn distributor_price(
        &self,
        product: ProductId,
        distributor: DistributorId,
    ) -> Result<Option<DistributorPrice>, Self::Error> {
        // A row whose JSON fails tier validation surfaces as a decode error,
        // which the resolver logs and skips.
        let row = sqlx::query_as::<_, DistributorPriceRow>(
            r"
            SELECT product_id, distributor_id, custom_price, tiers
            FROM commerce.distributor_price
            WHERE product_id = $1 AND distributor_id = $2
            ",
        )
        .bind(product)
        .bind(distributor)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| DistributorPrice {
            product_id: r.product_id,
            distributor_id: r.distributor_id,
            custom_price: r.custom_price,
            tiers: r.tiers.0,
        }))
    }

    async fn category_discount(
        &self,
        distributor: DistributorId,
        category: CategoryId,
    ) -> Result<Option<DiscountPercent>, Self::Error> {
        let value: Option<Decimal> = sqlx::query_scalar(
            r"
            SELECT discount_percent
            FROM commerce.category_discount
            WHERE distributor_id = $1 AND category_id = $2
            ",
        )
        .bind(distributor)
        .bind(category)
        .fetch_optional(&self.pool)
        .await?;
        percent(value, "category discount")
    }

    async fn default_discount(
        &self,
        distributor: DistributorId,
    ) -> Result<Option<DiscountPercent>, Self::Error> {
        let value: Option<Option<Decimal>> = sqlx::query_scalar(
            "SELECT default_discount_percent FROM commerce.distributor WHERE id = $1",
        )
        .bind(distributor)
        .fetch_optional(&self.pool)
        .await?;
        percent(value.flatten(), "default discount")
    }
}
