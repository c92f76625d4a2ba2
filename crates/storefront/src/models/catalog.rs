//! Catalog models.

use distrimart_core::{CategoryId, ProductId};
use distrimart_core::pricing::ProductPricing;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// An active catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub base_price: Decimal,
    pub category_id: Option<CategoryId>,
}

impl Product {
    /// The fields the pricing rules need.
    #[must_use]
    pub fn pricing(&self) -> ProductPricing {
        ProductPricing {
            id: self.id,
            sku: self.sku.clone(),
            name: self.name.clone(),
            category_id: self.category_id,
            base_price: self.base_price,
        }
    }
}
