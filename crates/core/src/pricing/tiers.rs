//! Quantity tier schedules.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{MoneyError, check_money};

/// A quantity bracket with its unit price.
///
/// `max_qty = None` means "and above".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    pub min_qty: u32,
    pub max_qty: Option<u32>,
    pub price: Decimal,
}

impl PriceTier {
    /// Whether `quantity` falls inside this tier's inclusive bracket.
    #[must_use]
    pub fn contains(&self, quantity: u32) -> bool {
        quantity >= self.min_qty && self.max_qty.is_none_or(|max| quantity <= max)
    }
}

/// Reasons a tier schedule is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TierError {
    #[error("tier {index}: minimum quantity must be at least 1")]
    InvalidMinimum { index: usize },
    #[error("tier {index}: maximum quantity {max} is below minimum {min}")]
    InvertedBracket { index: usize, min: u32, max: u32 },
    #[error("tier {index}: starts at {min} but previous tier covers up to {previous_max}")]
    Overlap {
        index: usize,
        min: u32,
        previous_max: u32,
    },
    #[error("tier {index}: only the last tier may be unbounded")]
    UnboundedNotLast { index: usize },
    #[error("tier {index}: price cannot be negative")]
    NegativePrice { index: usize },
    #[error("tier {index}: price has more than two decimal places")]
    SubCentPrice { index: usize },
    #[error("tier {index}: price exceeds 9999999999.99")]
    PriceTooLarge { index: usize },
}

impl TierError {
    fn from_money(index: usize, e: &MoneyError) -> Self {
        match e {
            MoneyError::Negative(_) => Self::NegativePrice { index },
            MoneyError::SubCent(_) => Self::SubCentPrice { index },
            MoneyError::TooLarge => Self::PriceTooLarge { index },
        }
    }
}

/// An ordered, non-overlapping list of [`PriceTier`]s.
///
/// Tiers are sorted by `min_qty` on construction; gaps between tiers are
/// allowed (quantities in a gap use the flat custom price).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PriceTier>", into = "Vec<PriceTier>")]
pub struct TierSchedule(Vec<PriceTier>);

impl TierSchedule {
    /// Validate and build a schedule.
    ///
    /// # Errors
    ///
    /// Returns the first [`TierError`] found after sorting by `min_qty`.
    pub fn new(mut tiers: Vec<PriceTier>) -> Result<Self, TierError> {
        tiers.sort_by_key(|t| t.min_qty);

        let last = tiers.len().saturating_sub(1);
        let mut previous_max: Option<u32> = None;

        for (index, tier) in tiers.iter().enumerate() {
            if tier.min_qty == 0 {
                return Err(TierError::InvalidMinimum { index });
            }
            if let Err(e) = check_money(tier.price) {
                return Err(TierError::from_money(index, &e));
            }
            if let Some(max) = tier.max_qty
                && max < tier.min_qty
            {
                return Err(TierError::InvertedBracket {
                    index,
                    min: tier.min_qty,
                    max,
                });
            }
            if tier.max_qty.is_none() && index != last {
                return Err(TierError::UnboundedNotLast { index });
            }
            if let Some(prev) = previous_max
                && tier.min_qty <= prev
            {
                return Err(TierError::Overlap {
                    index,
                    min: tier.min_qty,
                    previous_max: prev,
                });
            }
            previous_max = tier.max_qty;
        }

        Ok(Self(tiers))
    }

    /// The tier containing `quantity`, if any.
    #[must_use]
    pub fn find(&self, quantity: u32) -> Option<&PriceTier> {
        self.0.iter().find(|tier| tier.contains(quantity))
    }

    /// The tiers in ascending `min_qty` order.
    #[must_use]
    pub fn tiers(&self) -> &[PriceTier] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<PriceTier>> for TierSchedule {
    type Error = TierError;

    fn try_from(tiers: Vec<PriceTier>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl From<TierSchedule> for Vec<PriceTier> {
    fn from(schedule: TierSchedule) -> Self {
        schedule.0
    }
}
