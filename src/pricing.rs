//! Prices
//!
//! Line totals and the rounding rules shared by every amount the storefront displays.

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::items::LineItem;

/// Errors that can occur while calculating line totals.
#[derive(Debug, Error, PartialEq)]
pub enum LineTotalError {
    /// Quantities start at one.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// No line items were provided, so currency could not be determined.
    #[error("no line items provided; cannot determine currency")]
    NoItems,

    /// The total does not fit in minor units.
    #[error("line total overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Precision that computed amounts are rounded to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// Keep the currency's minor units (paise, pence).
    MinorUnits,

    /// Round to whole currency units, half-up.
    #[default]
    WholeUnits,
}

impl Precision {
    /// Round an amount in minor units to this precision, half-up.
    ///
    /// Returns `None` if the rounded value cannot be represented.
    pub fn round_minor(self, minor: i64, currency: &Currency) -> Option<i64> {
        self.round_decimal(Decimal::from_i64(minor)?, currency)
    }

    /// Round an exact amount in (possibly fractional) minor units to this precision, half-up,
    /// in a single step.
    ///
    /// Returns `None` if the rounded value cannot be represented.
    pub fn round_decimal(self, minor: Decimal, currency: &Currency) -> Option<i64> {
        match self {
            Precision::MinorUnits => minor
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64(),
            Precision::WholeUnits => {
                let scale = 10_i64.checked_pow(currency.exponent)?;
                let scale = Decimal::from_i64(scale)?;

                minor
                    .checked_div(scale)?
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    .checked_mul(scale)?
                    .to_i64()
            }
        }
    }
}

/// Calculates `(unit_price + Σ option_deltas) × quantity`, rounded to `precision`.
///
/// The effective unit price is clamped at zero so negative option deltas can never produce a
/// negative line total.
///
/// # Errors
///
/// - [`LineTotalError::ZeroQuantity`]: `quantity` was zero.
/// - [`LineTotalError::Money`]: an option delta is in a different currency.
/// - [`LineTotalError::Overflow`]: the total does not fit in minor units.
pub fn compute_line_total<'a>(
    unit_price: Money<'a, Currency>,
    quantity: u32,
    option_deltas: &[Money<'a, Currency>],
    precision: Precision,
) -> Result<Money<'a, Currency>, LineTotalError> {
    if quantity == 0 {
        return Err(LineTotalError::ZeroQuantity);
    }

    let currency = unit_price.currency();

    let effective = option_deltas
        .iter()
        .try_fold(unit_price, |acc, delta| acc.add(*delta))?;

    let total = effective
        .to_minor_units()
        .max(0)
        .checked_mul(i64::from(quantity))
        .ok_or(LineTotalError::Overflow)?;

    let rounded = precision
        .round_minor(total, currency)
        .ok_or(LineTotalError::Overflow)?;

    Ok(Money::from_minor(rounded, currency))
}

/// Calculates the total price of a list of line items.
///
/// # Errors
///
/// - [`LineTotalError::NoItems`]: No line items were provided, so currency could not be determined.
/// - Any error from [`compute_line_total`] for an individual line.
pub fn total_price<'a>(
    lines: &[LineItem<'a>],
    precision: Precision,
) -> Result<Money<'a, Currency>, LineTotalError> {
    let first = lines.first().ok_or(LineTotalError::NoItems)?;

    let total = lines.iter().try_fold(
        Money::from_minor(0, first.unit_price().currency()),
        |acc, line| -> Result<_, LineTotalError> { Ok(acc.add(line.total(precision)?)?) },
    )?;

    Ok(total)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, INR, USD};
    use testresult::TestResult;

    use crate::products::ProductKey;

    use super::*;

    #[test]
    fn line_total_without_options() -> TestResult {
        let total = compute_line_total(Money::from_minor(129_00, INR), 7, &[], Precision::WholeUnits)?;

        assert_eq!(total, Money::from_minor(903_00, INR));

        Ok(())
    }

    #[test]
    fn line_total_adds_option_deltas_per_unit() -> TestResult {
        let deltas = [Money::from_minor(50_00, INR), Money::from_minor(20_00, INR)];
        let total = compute_line_total(
            Money::from_minor(299_00, INR),
            3,
            &deltas,
            Precision::WholeUnits,
        )?;

        assert_eq!(total, Money::from_minor(1_107_00, INR));

        Ok(())
    }

    #[test]
    fn line_total_rounds_half_up_to_whole_units() -> TestResult {
        let total = compute_line_total(Money::from_minor(10_25, INR), 2, &[], Precision::WholeUnits)?;

        assert_eq!(total, Money::from_minor(21_00, INR));

        let total = compute_line_total(Money::from_minor(10_24, INR), 1, &[], Precision::WholeUnits)?;

        assert_eq!(total, Money::from_minor(10_00, INR));

        Ok(())
    }

    #[test]
    fn line_total_keeps_minor_units_when_asked() -> TestResult {
        let total = compute_line_total(Money::from_minor(10_25, GBP), 2, &[], Precision::MinorUnits)?;

        assert_eq!(total, Money::from_minor(20_50, GBP));

        Ok(())
    }

    #[test]
    fn line_total_clamps_negative_unit_price() -> TestResult {
        let deltas = [Money::from_minor(-500_00, INR)];
        let total = compute_line_total(
            Money::from_minor(299_00, INR),
            2,
            &deltas,
            Precision::WholeUnits,
        )?;

        assert_eq!(total, Money::from_minor(0, INR));

        Ok(())
    }

    #[test]
    fn line_total_rejects_zero_quantity() {
        let result = compute_line_total(Money::from_minor(100, INR), 0, &[], Precision::WholeUnits);

        assert_eq!(result, Err(LineTotalError::ZeroQuantity));
    }

    #[test]
    fn line_total_rejects_mixed_currencies() {
        let deltas = [Money::from_minor(100, USD)];
        let result = compute_line_total(
            Money::from_minor(100, INR),
            1,
            &deltas,
            Precision::WholeUnits,
        );

        assert!(matches!(result, Err(LineTotalError::Money(_))));
    }

    #[test]
    fn line_total_overflow_returns_error() {
        let result = compute_line_total(
            Money::from_minor(i64::MAX / 2, INR),
            3,
            &[],
            Precision::MinorUnits,
        );

        assert_eq!(result, Err(LineTotalError::Overflow));
    }

    #[test]
    fn line_total_is_linear_in_quantity() -> TestResult {
        let unit = Money::from_minor(149_00, INR);
        let deltas = [Money::from_minor(25_00, INR)];

        for quantity in 1..=20 {
            let single = compute_line_total(unit, quantity, &deltas, Precision::WholeUnits)?;
            let double = compute_line_total(unit, quantity * 2, &deltas, Precision::WholeUnits)?;

            assert_eq!(
                double.to_minor_units(),
                single.to_minor_units() * 2,
                "doubling quantity {quantity} should double the line total"
            );
        }

        Ok(())
    }

    #[test]
    fn total_price_sums_line_totals() -> TestResult {
        let lines = [
            LineItem::new(ProductKey::default(), 2, Money::from_minor(149_00, INR)),
            LineItem::new(ProductKey::default(), 1, Money::from_minor(299_00, INR)),
        ];

        assert_eq!(
            total_price(&lines, Precision::WholeUnits)?,
            Money::from_minor(597_00, INR)
        );

        Ok(())
    }

    #[test]
    fn total_price_empty() {
        let lines: [LineItem<'static>; 0] = [];

        assert_eq!(
            total_price(&lines, Precision::WholeUnits),
            Err(LineTotalError::NoItems)
        );
    }

    #[test]
    fn round_minor_whole_units_half_up() {
        assert_eq!(Precision::WholeUnits.round_minor(12_50, INR), Some(13_00));
        assert_eq!(Precision::WholeUnits.round_minor(12_49, INR), Some(12_00));
        assert_eq!(Precision::MinorUnits.round_minor(12_49, INR), Some(12_49));
    }

    #[test]
    fn round_decimal_rounds_fractional_minor_units_once() {
        // 2449.5 paise is ₹24.495
        let exact = Decimal::new(24495, 1);

        assert_eq!(Precision::WholeUnits.round_decimal(exact, INR), Some(24_00));
        assert_eq!(Precision::MinorUnits.round_decimal(exact, INR), Some(24_50));
        assert_eq!(
            Precision::WholeUnits.round_decimal(Decimal::new(-1250, 0), INR),
            Some(-13_00)
        );
    }
}
