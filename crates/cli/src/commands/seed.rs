//! Seed the commerce schema from a YAML file.
//!
//! The file is parsed and validated in full before connecting, then applied
//! in one transaction. Every row is upserted on its natural key (category
//! slug, product SKU, distributor email domain, custom domain), so seeding
//! the same file twice is harmless.
//!
//! ```yaml
//! categories:
//!   - { name: Fasteners, slug: fasteners }
//! products:
//!   - { sku: W-100, name: Widget, base_price: "20.00", category: fasteners }
//! distributors:
//!   - name: Acme Supply
//!     email_domain: acme.com
//!     default_discount: "5"
//!     domains: [{ domain: shop.acme.com, status: verified }]
//!     prices:
//!       - sku: W-100
//!         custom_price: "18.00"
//!         tiers: [{ min_qty: 10, max_qty: null, price: "16.00" }]
//!     category_discounts: [{ category: fasteners, discount_percent: "10" }]
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgConnection, types::Json};
use tracing::{error, info};

use distrimart_admin::models::distributor::{clean_color, clean_domain, clean_name, clean_optional};
use distrimart_core::pricing::TierSchedule;
use distrimart_core::{
    CategoryId, DiscountPercent, DistributorId, DomainStatus, ProductId, check_money,
};

use super::{CommandError, connect};

/// Top-level seed document.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub distributors: Vec<SeedDistributor>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedCategory {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedProduct {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_price: Decimal,
    /// Category slug.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

const fn active_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedDistributor {
    pub name: String,
    pub email_domain: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub brand_color: Option<String>,
    #[serde(default)]
    pub default_discount: Option<DiscountPercent>,
    #[serde(default)]
    pub domains: Vec<SeedDomain>,
    #[serde(default)]
    pub prices: Vec<SeedPrice>,
    #[serde(default)]
    pub category_discounts: Vec<SeedCategoryDiscount>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedDomain {
    pub domain: String,
    #[serde(default)]
    pub status: DomainStatus,
}

/// Custom price for a product by SKU. Tiers are validated while parsing.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedPrice {
    pub sku: String,
    pub custom_price: Decimal,
    #[serde(default)]
    pub tiers: TierSchedule,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedCategoryDiscount {
    pub category: String,
    pub discount_percent: DiscountPercent,
}

/// Row counts written by a seed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
    pub distributors: usize,
    pub domains: usize,
    pub prices: usize,
    pub category_discounts: usize,
}

impl SeedFile {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Fails on malformed YAML, unknown fields, out-of-range discounts and
    /// invalid tier schedules.
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Cross-reference checks that serde cannot express.
    ///
    /// Returns every problem found, not just the first.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut slugs = HashSet::new();
        for category in &self.categories {
            if category.name.trim().is_empty() {
                errors.push(format!("category {:?}: name is required", category.slug));
            }
            if !is_slug(&category.slug) {
                errors.push(format!(
                    "category {:?}: slug must be lowercase letters, digits and dashes",
                    category.slug
                ));
            }
            if !slugs.insert(category.slug.as_str()) {
                errors.push(format!("category {:?}: duplicate slug", category.slug));
            }
        }

        let mut skus = HashSet::new();
        for product in &self.products {
            let label = format!("product {:?}", product.sku);
            if product.sku.trim().is_empty() {
                errors.push("product: sku is required".to_owned());
            }
            if !skus.insert(product.sku.as_str()) {
                errors.push(format!("{label}: duplicate sku"));
            }
            if product.name.trim().is_empty() {
                errors.push(format!("{label}: name is required"));
            }
            if let Err(e) = check_money(product.base_price) {
                errors.push(format!("{label}: base price: {e}"));
            }
            if let Some(slug) = &product.category
                && !slugs.contains(slug.as_str())
            {
                errors.push(format!("{label}: unknown category {slug:?}"));
            }
        }

        let mut email_domains = HashSet::new();
        let mut custom_domains = HashSet::new();
        for distributor in &self.distributors {
            let label = format!("distributor {:?}", distributor.name);
            if let Err(e) = clean_name(&distributor.name) {
                errors.push(format!("{label}: {e}"));
            }
            match clean_domain(&distributor.email_domain) {
                Ok(domain) => {
                    if !email_domains.insert(domain) {
                        errors.push(format!("{label}: duplicate email domain"));
                    }
                }
                Err(e) => errors.push(format!("{label}: email domain: {e}")),
            }
            if let Some(color) = clean_optional(distributor.brand_color.as_deref())
                && let Err(e) = clean_color(&color)
            {
                errors.push(format!("{label}: {e}"));
            }

            for domain in &distributor.domains {
                match clean_domain(&domain.domain) {
                    Ok(domain) => {
                        if !custom_domains.insert(domain.clone()) {
                            errors.push(format!("{label}: domain {domain:?} is listed twice"));
                        }
                    }
                    Err(e) => errors.push(format!("{label}: {e}")),
                }
            }

            let mut priced = HashSet::new();
            for price in &distributor.prices {
                if !skus.contains(price.sku.as_str()) {
                    errors.push(format!("{label}: price for unknown sku {:?}", price.sku));
                }
                if !priced.insert(price.sku.as_str()) {
                    errors.push(format!("{label}: sku {:?} priced twice", price.sku));
                }
                if let Err(e) = check_money(price.custom_price) {
                    errors.push(format!("{label}: custom price for {:?}: {e}", price.sku));
                }
            }

            let mut discounted = HashSet::new();
            for discount in &distributor.category_discounts {
                if !slugs.contains(discount.category.as_str()) {
                    errors.push(format!(
                        "{label}: discount for unknown category {:?}",
                        discount.category
                    ));
                }
                if !discounted.insert(discount.category.as_str()) {
                    errors.push(format!(
                        "{label}: category {:?} discounted twice",
                        discount.category
                    ));
                }
            }
        }

        errors
    }
}

fn is_slug(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Load, validate and (unless `dry_run`) apply a seed file.
pub async fn run(path: &Path, dry_run: bool) -> Result<(), CommandError> {
    info!(path = %path.display(), "Loading seed file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let seed = SeedFile::parse(&content)?;

    let errors = seed.validate();
    if !errors.is_empty() {
        error!("Seed validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CommandError::Invalid(errors));
    }

    info!(
        categories = seed.categories.len(),
        products = seed.products.len(),
        distributors = seed.distributors.len(),
        "Seed file validated"
    );

    if dry_run {
        info!("Dry run, nothing written");
        return Ok(());
    }

    let pool = connect().await?;
    let mut tx = pool.begin().await?;
    let summary = apply(&mut tx, &seed).await?;
    tx.commit().await?;

    info!("Seeding complete!");
    info!("  Categories: {}", summary.categories);
    info!("  Products: {}", summary.products);
    info!("  Distributors: {}", summary.distributors);
    info!("  Custom domains: {}", summary.domains);
    info!("  Distributor prices: {}", summary.prices);
    info!("  Category discounts: {}", summary.category_discounts);

    Ok(())
}

/// Write a validated seed file.
async fn apply(conn: &mut PgConnection, seed: &SeedFile) -> Result<SeedSummary, CommandError> {
    let mut summary = SeedSummary::default();

    let mut categories: HashMap<&str, CategoryId> = HashMap::new();
    for category in &seed.categories {
        let id: CategoryId = sqlx::query_scalar(
            r"
            INSERT INTO commerce.category (name, slug)
            VALUES ($1, $2)
            ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            ",
        )
        .bind(category.name.trim())
        .bind(&category.slug)
        .fetch_one(&mut *conn)
        .await?;
        categories.insert(category.slug.as_str(), id);
        summary.categories += 1;
    }

    let mut products: HashMap<&str, ProductId> = HashMap::new();
    for product in &seed.products {
        let category_id = product
            .category
            .as_deref()
            .and_then(|slug| categories.get(slug).copied());
        let id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO commerce.product (sku, name, description, base_price, category_id, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (sku) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                base_price = EXCLUDED.base_price,
                category_id = EXCLUDED.category_id,
                active = EXCLUDED.active,
                updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(product.sku.trim())
        .bind(product.name.trim())
        .bind(&product.description)
        .bind(product.base_price)
        .bind(category_id)
        .bind(product.active)
        .fetch_one(&mut *conn)
        .await?;
        products.insert(product.sku.as_str(), id);
        summary.products += 1;
    }

    for distributor in &seed.distributors {
        let id = upsert_distributor(conn, distributor).await?;
        summary.distributors += 1;

        for domain in &distributor.domains {
            let name = clean_domain(&domain.domain)
                .map_err(|e| CommandError::Invalid(vec![e.to_string()]))?;
            sqlx::query(
                r"
                INSERT INTO commerce.distributor_domain (distributor_id, domain, status)
                VALUES ($1, $2, $3)
                ON CONFLICT (domain) DO UPDATE SET
                    distributor_id = EXCLUDED.distributor_id,
                    status = EXCLUDED.status
                ",
            )
            .bind(id)
            .bind(name)
            .bind(domain.status)
            .execute(&mut *conn)
            .await?;
            summary.domains += 1;
        }

        for price in &distributor.prices {
            let Some(&product_id) = products.get(price.sku.as_str()) else {
                continue;
            };
            sqlx::query(
                r"
                INSERT INTO commerce.distributor_price (product_id, distributor_id, custom_price, tiers)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (product_id, distributor_id) DO UPDATE SET
                    custom_price = EXCLUDED.custom_price,
                    tiers = EXCLUDED.tiers,
                    updated_at = NOW()
                ",
            )
            .bind(product_id)
            .bind(id)
            .bind(price.custom_price)
            .bind(Json(&price.tiers))
            .execute(&mut *conn)
            .await?;
            summary.prices += 1;
        }

        for discount in &distributor.category_discounts {
            let Some(&category_id) = categories.get(discount.category.as_str()) else {
                continue;
            };
            sqlx::query(
                r"
                INSERT INTO commerce.category_discount (distributor_id, category_id, discount_percent)
                VALUES ($1, $2, $3)
                ON CONFLICT (distributor_id, category_id) DO UPDATE SET
                    discount_percent = EXCLUDED.discount_percent,
                    updated_at = NOW()
                ",
            )
            .bind(id)
            .bind(category_id)
            .bind(discount.discount_percent.value())
            .execute(&mut *conn)
            .await?;
            summary.category_discounts += 1;
        }
    }

    Ok(summary)
}

async fn upsert_distributor(
    conn: &mut PgConnection,
    distributor: &SeedDistributor,
) -> Result<DistributorId, CommandError> {
    let invalid = |e: distrimart_admin::models::distributor::DistributorInputError| {
        CommandError::Invalid(vec![e.to_string()])
    };
    let name = clean_name(&distributor.name).map_err(invalid)?;
    let email_domain = clean_domain(&distributor.email_domain).map_err(invalid)?;
    let brand_color = clean_optional(distributor.brand_color.as_deref())
        .map(|c| clean_color(&c))
        .transpose()
        .map_err(invalid)?;

    let id = sqlx::query_scalar(
        r"
        INSERT INTO commerce.distributor
            (name, email_domain, logo_url, brand_color, default_discount_percent)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT ((lower(email_domain))) DO UPDATE SET
            name = EXCLUDED.name,
            logo_url = EXCLUDED.logo_url,
            brand_color = EXCLUDED.brand_color,
            default_discount_percent = EXCLUDED.default_discount_percent,
            updated_at = NOW()
        RETURNING id
        ",
    )
    .bind(name)
    .bind(email_domain)
    .bind(clean_optional(distributor.logo_url.as_deref()))
    .bind(brand_color)
    .bind(distributor.default_discount.map(DiscountPercent::value))
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}
