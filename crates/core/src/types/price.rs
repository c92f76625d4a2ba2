//! Money helpers and discount percentages.
//!
//! Amounts are plain [`Decimal`] values in the store currency. Percentage
//! discounts are always taken off the product's base price and rounded to
//! cents, so a discount can lower a price but never raise it.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places kept for money amounts.
pub const MONEY_SCALE: u32 = 2;

/// Round an amount to cents, midpoint away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Largest amount a money column (`NUMERIC(12, 2)`) can hold: 9,999,999,999.99.
pub const MAX_MONEY: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, MONEY_SCALE);

/// Reasons an amount cannot be stored as money.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("amount cannot be negative (got {0})")]
    Negative(Decimal),
    #[error("amount has more than two decimal places (got {0})")]
    SubCent(Decimal),
    #[error("amount exceeds the largest storable value 9999999999.99")]
    TooLarge,
}

/// Check that a price or total fits a money column exactly: non-negative,
/// at most [`MAX_MONEY`], and with no more than [`MONEY_SCALE`] decimals.
///
/// # Errors
///
/// Returns the first [`MoneyError`] that applies.
pub fn check_money(amount: Decimal) -> Result<Decimal, MoneyError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::Negative(amount));
    }
    if amount > MAX_MONEY {
        return Err(MoneyError::TooLarge);
    }
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(MoneyError::SubCent(amount));
    }
    Ok(amount)
}

/// `unit_price * quantity`, rounded to cents and checked against
/// [`MAX_MONEY`] instead of overflowing.
///
/// # Errors
///
/// Returns [`MoneyError::TooLarge`] when the product does not fit.
pub fn line_total(unit_price: Decimal, quantity: u32) -> Result<Decimal, MoneyError> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .map(round_money)
        .filter(|total| *total <= MAX_MONEY)
        .ok_or(MoneyError::TooLarge)
}

/// Errors that can occur when constructing a [`DiscountPercent`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PercentError {
    #[error("discount percent must be between 0 and 100 (got {0})")]
    OutOfRange(Decimal),
}

/// A discount percentage in the closed range `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct DiscountPercent(Decimal);

impl DiscountPercent {
    /// Create a discount percent.
    ///
    /// # Errors
    ///
    /// Returns [`PercentError::OutOfRange`] for values below 0 or above 100.
    pub fn new(value: Decimal) -> Result<Self, PercentError> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(PercentError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    /// The percentage as a decimal number (e.g. `12.5`).
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Apply the discount to a base price.
    ///
    /// ```
    /// use distrimart_core::DiscountPercent;
    /// use rust_decimal::Decimal;
    ///
    /// let ten = DiscountPercent::new(Decimal::TEN).unwrap();
    /// assert_eq!(ten.apply(Decimal::new(1999, 2)), Decimal::new(1799, 2));
    /// ```
    #[must_use]
    pub fn apply(self, base_price: Decimal) -> Decimal {
        let factor = (Decimal::ONE_HUNDRED - self.0) / Decimal::ONE_HUNDRED;
        round_money(base_price * factor)
    }
}

impl TryFrom<Decimal> for DiscountPercent {
    type Error = PercentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DiscountPercent> for Decimal {
    fn from(percent: DiscountPercent) -> Self {
        percent.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_round_money_midpoint_away_from_zero() {
        assert_eq!(round_money(d("10.005")), d("10.01"));
        assert_eq!(round_money(d("10.004")), d("10.00"));
    }

    #[test]
    fn test_max_money_matches_column_range() {
        assert_eq!(MAX_MONEY, Decimal::new(999_999_999_999, 2));
    }

    #[test]
    fn test_check_money() {
        assert_eq!(check_money(d("4.50")), Ok(d("4.50")));
        assert_eq!(check_money(d("4.500")), Ok(d("4.500")));
        assert_eq!(check_money(Decimal::ZERO), Ok(Decimal::ZERO));
        assert_eq!(check_money(MAX_MONEY), Ok(MAX_MONEY));
        assert_eq!(check_money(d("-0.01")), Err(MoneyError::Negative(d("-0.01"))));
        assert_eq!(check_money(d("4.555")), Err(MoneyError::SubCent(d("4.555"))));
        assert_eq!(check_money(d("10000000000.00")), Err(MoneyError::TooLarge));
        assert_eq!(check_money(Decimal::MAX), Err(MoneyError::TooLarge));
    }

    #[test]
    fn test_line_total_is_checked() {
        assert_eq!(line_total(d("3.33"), 3), Ok(d("9.99")));
        assert_eq!(line_total(d("20.00"), 1_000_000_000), Err(MoneyError::TooLarge));
        assert_eq!(line_total(Decimal::MAX, u32::MAX), Err(MoneyError::TooLarge));
    }

    #[test]
    fn test_percent_range() {
        assert!(DiscountPercent::new(d("0")).is_ok());
        assert!(DiscountPercent::new(d("100")).is_ok());
        assert!(DiscountPercent::new(d("-0.01")).is_err());
        assert!(DiscountPercent::new(d("100.01")).is_err());
    }

    #[test]
    fn test_apply_never_exceeds_base() {
        let base = d("49.99");
        for pct in ["0", "0.5", "12.5", "33.333", "99.99", "100"] {
            let discounted = DiscountPercent::new(d(pct)).unwrap().apply(base);
            assert!(discounted <= base, "{pct}% produced {discounted}");
            assert!(discounted >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_apply_full_discount_is_zero() {
        let free = DiscountPercent::new(Decimal::ONE_HUNDRED).unwrap();
        assert_eq!(free.apply(d("20.00")), Decimal::ZERO);
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<DiscountPercent>("\"15\"").is_ok());
        assert!(serde_json::from_str::<DiscountPercent>("\"150\"").is_err());
    }
}
