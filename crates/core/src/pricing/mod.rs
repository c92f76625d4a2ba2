//! Distributor-aware price resolution.
//!
//! # Precedence
//!
//! For a product, an optional tenant and a quantity, the unit price is the
//! first rule that applies:
//!
//! 1. The tenant's [`DistributorPrice`] for the product: the tier whose
//!    bracket contains the quantity, else the flat custom price.
//! 2. The tenant's category discount for the product's category.
//! 3. The tenant's default discount.
//! 4. The product's base price.
//!
//! Percentages are always taken off the base price and never compound.

mod cart;
mod tiers;

use std::future::Future;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::types::{CategoryId, DiscountPercent, DistributorId, MoneyError, ProductId};

pub use cart::{LineRequest, MAX_LINE_QUANTITY, PricedCart, PricedLine, merge_lines, price_lines};
pub use tiers::{PriceTier, TierError, TierSchedule};

/// The pricing-relevant fields of a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPricing {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub category_id: Option<CategoryId>,
    pub base_price: Decimal,
}

/// A distributor's negotiated price for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributorPrice {
    pub product_id: ProductId,
    pub distributor_id: DistributorId,
    pub custom_price: Decimal,
    pub tiers: TierSchedule,
}

impl DistributorPrice {
    /// The unit price for `quantity` and the tier that produced it.
    #[must_use]
    pub fn price_for(&self, quantity: u32) -> (Decimal, Option<&PriceTier>) {
        self.tiers
            .find(quantity)
            .map_or((self.custom_price, None), |tier| (tier.price, Some(tier)))
    }
}

/// Which rule produced a resolved price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceSource {
    Tier {
        min_qty: u32,
        max_qty: Option<u32>,
    },
    CustomPrice,
    CategoryDiscount {
        percent: DiscountPercent,
    },
    DefaultDiscount {
        percent: DiscountPercent,
    },
    Base,
    /// Unit price agreed on a quote request, bypassing the rules above.
    Quoted,
}

impl PriceSource {
    /// Short label for storage and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tier { .. } => "tier",
            Self::CustomPrice => "custom_price",
            Self::CategoryDiscount { .. } => "category_discount",
            Self::DefaultDiscount { .. } => "default_discount",
            Self::Base => "base",
            Self::Quoted => "quoted",
        }
    }
}

/// An effective unit price with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrice {
    pub product_id: ProductId,
    pub quantity: u32,
    pub base_price: Decimal,
    pub unit_price: Decimal,
    pub source: PriceSource,
}

/// Everything the precedence rules look at, already loaded.
#[derive(Debug, Clone, Default)]
pub struct PricingRules {
    pub distributor_price: Option<DistributorPrice>,
    pub category_discount: Option<DiscountPercent>,
    pub default_discount: Option<DiscountPercent>,
}

/// Apply the precedence rules to a product. Quantity 0 is treated as 1.
#[must_use]
pub fn resolve_unit_price(
    product: &ProductPricing,
    rules: &PricingRules,
    quantity: u32,
) -> ResolvedPrice {
    let quantity = quantity.max(1);
    let base_price = product.base_price;

    let (unit_price, source) = if let Some(custom) = &rules.distributor_price {
        match custom.price_for(quantity) {
            (price, Some(tier)) => (
                price,
                PriceSource::Tier {
                    min_qty: tier.min_qty,
                    max_qty: tier.max_qty,
                },
            ),
            (price, None) => (price, PriceSource::CustomPrice),
        }
    } else if let Some(percent) = rules.category_discount {
        (
            percent.apply(base_price),
            PriceSource::CategoryDiscount { percent },
        )
    } else if let Some(percent) = rules.default_discount {
        (
            percent.apply(base_price),
            PriceSource::DefaultDiscount { percent },
        )
    } else {
        (base_price, PriceSource::Base)
    };

    ResolvedPrice {
        product_id: product.id,
        quantity,
        base_price,
        unit_price,
        source,
    }
}

/// Errors from [`resolve_price`].
#[derive(Debug, thiserror::Error)]
pub enum PricingError<E: std::error::Error + 'static> {
    #[error("product {0} not found")]
    ProductNotFound(ProductId),
    #[error("pricing lookup failed: {0}")]
    Source(#[source] E),
    #[error(transparent)]
    Amount(#[from] MoneyError),
}

/// Lookup operations the resolver needs from persistent storage.
pub trait PricingSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load an active product.
    fn product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<ProductPricing>, Self::Error>> + Send;

    fn distributor_price(
        &self,
        product: ProductId,
        distributor: DistributorId,
    ) -> impl Future<Output = Result<Option<DistributorPrice>, Self::Error>> + Send;

    fn category_discount(
        &self,
        distributor: DistributorId,
        category: CategoryId,
    ) -> impl Future<Output = Result<Option<DiscountPercent>, Self::Error>> + Send;

    fn default_discount(
        &self,
        distributor: DistributorId,
    ) -> impl Future<Output = Result<Option<DiscountPercent>, Self::Error>> + Send;
}

/// Load the rules for one product and tenant, lazily and in precedence order.
///
/// A failed lookup is logged and treated as "no rule", so pricing degrades
/// toward the base price instead of failing.
pub async fn load_rules<S: PricingSource>(
    source: &S,
    product: &ProductPricing,
    tenant: DistributorId,
) -> PricingRules {
    let mut rules = PricingRules::default();

    match source.distributor_price(product.id, tenant).await {
        Ok(Some(custom)) => {
            rules.distributor_price = Some(custom);
            return rules;
        }
        Ok(None) => {}
        Err(e) => warn!(product_id = %product.id, tenant_id = %tenant, error = %e, "Distributor price lookup failed"),
    }

    if let Some(category) = product.category_id {
        match source.category_discount(tenant, category).await {
            Ok(Some(percent)) => {
                rules.category_discount = Some(percent);
                return rules;
            }
            Ok(None) => {}
            Err(e) => warn!(tenant_id = %tenant, category_id = %category, error = %e, "Category discount lookup failed"),
        }
    }

    match source.default_discount(tenant).await {
        Ok(percent) => rules.default_discount = percent,
        Err(e) => warn!(tenant_id = %tenant, error = %e, "Default discount lookup failed"),
    }

    rules
}

/// Resolve the effective unit price of a product for an optional tenant.
///
/// # Errors
///
/// Returns [`PricingError::ProductNotFound`] for unknown or inactive products
/// and [`PricingError::Source`] if the product itself cannot be loaded.
#[instrument(skip(source))]
pub async fn resolve_price<S: PricingSource>(
    source: &S,
    product_id: ProductId,
    tenant: Option<DistributorId>,
    quantity: u32,
) -> Result<ResolvedPrice, PricingError<S::Error>> {
    let product = load_product(source, product_id).await?;
    Ok(price_product(source, &product, tenant, quantity).await)
}

/// Load a product, mapping a missing one to [`PricingError::ProductNotFound`].
pub(crate) async fn load_product<S: PricingSource>(
    source: &S,
    product_id: ProductId,
) -> Result<ProductPricing, PricingError<S::Error>> {
    source
        .product(product_id)
        .await
        .map_err(PricingError::Source)?
        .ok_or(PricingError::ProductNotFound(product_id))
}

/// Resolve the price of an already loaded product.
pub async fn price_product<S: PricingSource>(
    source: &S,
    product: &ProductPricing,
    tenant: Option<DistributorId>,
    quantity: u32,
) -> ResolvedPrice {
    let rules = match tenant {
        Some(tenant) => load_rules(source, product, tenant).await,
        None => PricingRules::default(),
    };
    resolve_unit_price(product, &rules, quantity)
}
