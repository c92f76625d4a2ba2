//! Quote request models.

use chrono::{DateTime, Utc};
use distrimart_core::{DistributorId, Email, OrderId, ProductId, QuoteId, QuoteStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A quote request header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Quote {
    pub id: QuoteId,
    pub distributor_id: Option<DistributorId>,
    pub customer_email: Email,
    pub customer_name: String,
    pub company: Option<String>,
    pub message: Option<String>,
    pub status: QuoteStatus,
    pub order_id: Option<OrderId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A requested product and quantity, optionally with an agreed unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub quoted_unit_price: Option<Decimal>,
}

/// An agreed unit price for one product on a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotedPrice {
    pub product_id: ProductId,
    pub quoted_unit_price: Decimal,
}

/// A quote request with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteDetail {
    #[serde(flatten)]
    pub quote: Quote,
    pub items: Vec<QuoteItem>,
}

/// Input for creating a quote request.
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub distributor_id: Option<DistributorId>,
    pub customer_email: Email,
    pub customer_name: String,
    pub company: Option<String>,
    pub message: Option<String>,
    pub items: Vec<QuoteItem>,
}
