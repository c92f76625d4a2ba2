//! Pricing of multi-line carts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{PricingError, PricingSource, ProductPricing, ResolvedPrice, load_product, price_product};
use crate::types::{DistributorId, MAX_MONEY, MoneyError, ProductId, line_total};

/// Largest quantity accepted for one product in a cart, order or quote.
pub const MAX_LINE_QUANTITY: u32 = 1_000_000;

/// A requested cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A cart line with its resolved price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub sku: String,
    pub name: String,
    #[serde(flatten)]
    pub price: ResolvedPrice,
    pub line_total: Decimal,
}

impl PricedLine {
    /// Build a line from a product and a resolved unit price.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::TooLarge`] if the line total does not fit a
    /// money column.
    pub fn new(product: &ProductPricing, price: ResolvedPrice) -> Result<Self, MoneyError> {
        Ok(Self {
            sku: product.sku.clone(),
            name: product.name.clone(),
            line_total: line_total(price.unit_price, price.quantity)?,
            price,
        })
    }
}

/// Priced lines and their subtotal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub subtotal: Decimal,
}

impl PricedCart {
    /// Sum already priced lines.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::TooLarge`] if the subtotal does not fit a money
    /// column.
    pub fn from_lines(lines: Vec<PricedLine>) -> Result<Self, MoneyError> {
        let subtotal = lines
            .iter()
            .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.line_total))
            .filter(|sum| *sum <= MAX_MONEY)
            .ok_or(MoneyError::TooLarge)?;
        Ok(Self { lines, subtotal })
    }
}

/// Combine lines for the same product, keeping first-seen order.
///
/// Tier brackets apply to the total quantity of a product, so two lines of 5
/// are priced as one line of 10.
#[must_use]
pub fn merge_lines(lines: &[LineRequest]) -> Vec<LineRequest> {
    let mut merged: Vec<LineRequest> = Vec::with_capacity(lines.len());
    for line in lines {
        if let Some(existing) = merged.iter_mut().find(|l| l.product_id == line.product_id) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            merged.push(*line);
        }
    }
    merged
}

/// Price every line of a cart for an optional tenant.
///
/// # Errors
///
/// Fails with [`PricingError::ProductNotFound`] on the first unknown product,
/// [`PricingError::Source`] if a product cannot be loaded, or
/// [`PricingError::Amount`] if a total does not fit a money column.
pub async fn price_lines<S: PricingSource>(
    source: &S,
    tenant: Option<DistributorId>,
    lines: &[LineRequest],
) -> Result<PricedCart, PricingError<S::Error>> {
    let mut priced = Vec::with_capacity(lines.len());

    for line in merge_lines(lines) {
        let product = load_product(source, line.product_id).await?;
        let price = price_product(source, &product, tenant, line.quantity).await;
        priced.push(PricedLine::new(&product, price)?);
    }

    Ok(PricedCart::from_lines(priced)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pricing::PriceSource;
    use crate::pricing::tests::{ACME, GADGET, WIDGET, d, source};

    fn line(product_id: ProductId, quantity: u32) -> LineRequest {
        LineRequest {
            product_id,
            quantity,
        }
    }

    #[test]
    fn test_merge_lines_sums_duplicates_in_order() {
        let merged = merge_lines(&[line(GADGET, 1), line(WIDGET, 5), line(GADGET, 2)]);
        assert_eq!(merged, vec![line(GADGET, 3), line(WIDGET, 5)]);
    }

    #[tokio::test]
    async fn test_duplicate_lines_reach_tier_together() {
        let cart = price_lines(&source(), Some(ACME), &[line(WIDGET, 5), line(WIDGET, 5)])
            .await
            .unwrap();

        assert_eq!(cart.lines.len(), 1);
        let widget = &cart.lines[0];
        assert_eq!(widget.price.quantity, 10);
        assert_eq!(widget.price.unit_price, d("16.00"));
        assert!(matches!(widget.price.source, PriceSource::Tier { .. }));
        assert_eq!(widget.line_total, d("160.00"));
    }

    #[tokio::test]
    async fn test_subtotal_for_anonymous_cart() {
        let cart = price_lines(&source(), None, &[line(WIDGET, 2), line(GADGET, 1)])
            .await
            .unwrap();
        assert_eq!(cart.subtotal, d("90.00"));
    }

    #[tokio::test]
    async fn test_unknown_product_fails_whole_cart() {
        let result = price_lines(&source(), None, &[line(WIDGET, 1), line(ProductId::new(42), 1)]).await;
        assert!(matches!(result, Err(PricingError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_totals_beyond_money_range_are_errors() {
        let mut source = source();
        source
            .products
            .insert(GADGET, crate::pricing::tests::product(GADGET, "9999999999.99"));

        let result = price_lines(&source, None, &[line(GADGET, MAX_LINE_QUANTITY)]).await;
        assert!(matches!(result, Err(PricingError::Amount(MoneyError::TooLarge))));

        // Each line fits, the subtotal does not.
        let result = price_lines(&source, None, &[line(GADGET, 1), line(WIDGET, 1)]).await;
        assert!(matches!(result, Err(PricingError::Amount(MoneyError::TooLarge))));
    }

    #[test]
    fn test_huge_unit_price_does_not_panic() {
        let product = crate::pricing::tests::product(WIDGET, "20.00");
        let mut price = crate::pricing::resolve_unit_price(&product, &Default::default(), 3);
        price.unit_price = Decimal::MAX;
        assert_eq!(PricedLine::new(&product, price), Err(MoneyError::TooLarge));
    }

    #[test]
    fn test_priced_line_serializes_flat() {
        let product = crate::pricing::tests::product(WIDGET, "20.00");
        let price = crate::pricing::resolve_unit_price(&product, &Default::default(), 3);
        let json = serde_json::to_value(PricedLine::new(&product, price).unwrap()).unwrap();
        assert_eq!(json["quantity"], 3);
        assert_eq!(json["line_total"], "60.00");
        assert_eq!(json["source"]["kind"], "base");
    }
}
