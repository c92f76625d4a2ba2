//! Pricing rule payloads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use distrimart_core::pricing::TierSchedule;
use distrimart_core::{CategoryId, DiscountPercent, DistributorId};

/// Body of `PUT /api/distributors/{id}/prices/{product}`.
///
/// `tiers` is validated on deserialization; overlapping or unordered brackets
/// are rejected before anything is written.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceRule {
    pub custom_price: Decimal,
    #[serde(default)]
    pub tiers: TierSchedule,
}

/// A stored category discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDiscount {
    pub distributor_id: DistributorId,
    pub category_id: CategoryId,
    pub discount_percent: DiscountPercent,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_rule_defaults_to_no_tiers() {
        let rule: PriceRule = serde_json::from_str(r#"{"custom_price": "19.50"}"#).unwrap();
        assert!(rule.tiers.is_empty());
    }

    #[test]
    fn test_price_rule_rejects_overlapping_tiers() {
        let body = r#"{
            "custom_price": "20.00",
            "tiers": [
                {"min_qty": 1, "max_qty": 10, "price": "18.00"},
                {"min_qty": 5, "max_qty": null, "price": "15.00"}
            ]
        }"#;
        assert!(serde_json::from_str::<PriceRule>(body).is_err());
    }
}
