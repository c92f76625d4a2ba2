//! Order models.

use chrono::{DateTime, Utc};
use distrimart_core::pricing::PricedCart;
use distrimart_core::{DistributorId, Email, OrderId, OrderStatus, ProductId, QuoteId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An order header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub distributor_id: Option<DistributorId>,
    pub customer_email: Email,
    pub customer_name: String,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub quote_id: Option<QuoteId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A priced order line, frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub price_source: String,
}

/// One row of the order audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StatusChange {
    pub from_status: Option<OrderStatus>,
    pub to_status: OrderStatus,
    pub note: Option<String>,
    pub changed_at: DateTime<Utc>,
}

/// An order with its lines and status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub history: Vec<StatusChange>,
}

/// Input for creating an order from a priced cart.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub distributor_id: Option<DistributorId>,
    pub customer_email: Email,
    pub customer_name: String,
    pub cart: PricedCart,
    pub quote_id: Option<QuoteId>,
    pub note: Option<String>,
}
