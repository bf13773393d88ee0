//! Bulk Pricing Tiers
//!
//! A tier schedule maps order quantities to unit prices: ordering more units unlocks a lower
//! price per unit (e.g. 1+ at ₹299, 2+ at ₹149, 5+ at ₹129, 10+ at ₹99).
//!
//! Resolution picks the tier with the greatest threshold not exceeding the requested quantity.
//! When the quantity is below every threshold the smallest-threshold tier acts as the base price,
//! so every quantity of at least one resolves to exactly one tier.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

/// Invalid quantity or tier data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TierError {
    /// No tiers were provided.
    #[error("at least one pricing tier is required")]
    NoTiers,

    /// Quantities start at one.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// Tier thresholds start at one.
    #[error("tier threshold must be at least 1")]
    ZeroThreshold,

    /// Two tiers share a threshold.
    #[error("duplicate tier threshold {0}")]
    DuplicateThreshold(u32),

    /// A tier has a negative unit price (threshold).
    #[error("tier at threshold {0} has a negative unit price")]
    NegativePrice(u32),

    /// A larger threshold has a higher unit price than a smaller one.
    #[error("tier at threshold {0} is more expensive per unit than the tier below it")]
    PriceIncreases(u32),

    /// Tiers are priced in different currencies (threshold, tier currency, schedule currency).
    #[error("tier at threshold {0} has currency {1}, but schedule has currency {2}")]
    CurrencyMismatch(u32, &'static str, &'static str),
}

/// A single bulk pricing tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingTier<'a> {
    threshold: u32,
    unit_price: Money<'a, Currency>,
}

impl<'a> PricingTier<'a> {
    /// Create a tier that applies from `threshold` units upwards.
    pub fn new(threshold: u32, unit_price: Money<'a, Currency>) -> Self {
        Self {
            threshold,
            unit_price,
        }
    }

    /// Minimum quantity for this tier.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Price per unit within this tier.
    pub fn unit_price(&self) -> Money<'a, Currency> {
        self.unit_price
    }
}

/// Resolve the unit price for `quantity` units.
///
/// Tiers may be given in any order. The tier with the greatest threshold not exceeding
/// `quantity` wins; if `quantity` is below every threshold, the smallest-threshold tier is used.
///
/// # Errors
///
/// - [`TierError::NoTiers`]: `tiers` is empty.
/// - [`TierError::ZeroQuantity`]: `quantity` is zero.
pub fn resolve_unit_price<'a>(
    quantity: u32,
    tiers: &[PricingTier<'a>],
) -> Result<Money<'a, Currency>, TierError> {
    if quantity == 0 {
        return Err(TierError::ZeroQuantity);
    }

    let tier = tiers
        .iter()
        .filter(|tier| tier.threshold <= quantity)
        .max_by_key(|tier| tier.threshold)
        .or_else(|| tiers.iter().min_by_key(|tier| tier.threshold))
        .ok_or(TierError::NoTiers)?;

    Ok(tier.unit_price)
}

/// A validated bulk pricing schedule.
///
/// Tiers are held sorted by ascending threshold. Thresholds are strictly increasing, unit
/// prices never increase with the threshold and every tier shares one currency.
#[derive(Debug, Clone, PartialEq)]
pub struct TierSchedule<'a> {
    tiers: SmallVec<[PricingTier<'a>; 4]>,
}

impl<'a> TierSchedule<'a> {
    /// Create a schedule from tiers in any order.
    ///
    /// # Errors
    ///
    /// Returns a [`TierError`] if the tiers are empty, contain a zero or duplicate threshold,
    /// a negative price, mixed currencies, or a price that rises with quantity.
    pub fn new(tiers: impl IntoIterator<Item = PricingTier<'a>>) -> Result<Self, TierError> {
        let mut tiers: SmallVec<[PricingTier<'a>; 4]> = tiers.into_iter().collect();

        tiers.sort_by_key(PricingTier::threshold);

        let first = tiers.first().ok_or(TierError::NoTiers)?;
        let currency = first.unit_price.currency();

        let mut previous: Option<&PricingTier<'a>> = None;

        for tier in &tiers {
            if tier.threshold == 0 {
                return Err(TierError::ZeroThreshold);
            }

            if tier.unit_price.to_minor_units() < 0 {
                return Err(TierError::NegativePrice(tier.threshold));
            }

            if tier.unit_price.currency() != currency {
                return Err(TierError::CurrencyMismatch(
                    tier.threshold,
                    tier.unit_price.currency().iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if let Some(previous) = previous {
                if previous.threshold == tier.threshold {
                    return Err(TierError::DuplicateThreshold(tier.threshold));
                }

                if tier.unit_price.to_minor_units() > previous.unit_price.to_minor_units() {
                    return Err(TierError::PriceIncreases(tier.threshold));
                }
            }

            previous = Some(tier);
        }

        Ok(Self { tiers })
    }

    /// Resolve the unit price for `quantity` units.
    ///
    /// # Errors
    ///
    /// Returns [`TierError::ZeroQuantity`] if `quantity` is zero.
    pub fn unit_price(&self, quantity: u32) -> Result<Money<'a, Currency>, TierError> {
        resolve_unit_price(quantity, &self.tiers)
    }

    /// Price of the smallest-threshold tier.
    pub fn base_price(&self) -> Option<Money<'a, Currency>> {
        self.tiers.first().map(PricingTier::unit_price)
    }

    /// Currency every tier is priced in.
    pub fn currency(&self) -> Option<&'a Currency> {
        self.tiers.first().map(|tier| tier.unit_price.currency())
    }

    /// Tiers in ascending threshold order.
    pub fn tiers(&self) -> &[PricingTier<'a>] {
        &self.tiers
    }
}
