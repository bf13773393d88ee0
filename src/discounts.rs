//! Discount utilities
//!
//! Percentage arithmetic shared by the coupon and payment-method discount appliers.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::pricing::Precision;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Convert a value expressed in percent points (e.g. `10` for 10%) into a [`Percentage`].
pub fn percent_points(value: Decimal) -> Percentage {
    Percentage::from(value / Decimal::ONE_HUNDRED)
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the result overflows or cannot be represented
/// in minor units.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the inner Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Calculate the discount on an amount for a percentage, rounded to `precision`.
///
/// # Errors
///
/// Returns a [`DiscountError`] if the percentage or rounding cannot be represented.
pub fn discount_on<'a>(
    amount: &Money<'a, Currency>,
    percent: &Percentage,
    precision: Precision,
) -> Result<Money<'a, Currency>, DiscountError> {
    let currency = amount.currency();
    let minor =
        Decimal::from_i64(amount.to_minor_units()).ok_or(DiscountError::PercentConversion)?;

    // Rounded once, straight to `precision`
    let exact = ((*percent) * Decimal::ONE)
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?;
    let rounded = precision
        .round_decimal(exact, currency)
        .ok_or(DiscountError::PercentConversion)?;

    Ok(Money::from_minor(rounded, currency))
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use rusty_money::iso::INR;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn percent_of_minor_calculates_correctly() -> TestResult {
        let percent = Percentage::from(0.25);

        assert_eq!(percent_of_minor(&percent, 200)?, 50);

        Ok(())
    }

    #[test]
    fn percent_of_minor_rounds_half_away_from_zero() -> TestResult {
        let percent = Percentage::from(0.5);

        assert_eq!(percent_of_minor(&percent, 5)?, 3);

        Ok(())
    }

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let percent = Percentage::from(2.0);
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(DiscountError::PercentConversion)));
    }

    #[test]
    fn percent_of_minor_checked_mul_overflow_returns_error() -> TestResult {
        let percent = Percentage::try_from("100000000000000000000")?;
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(DiscountError::PercentConversion)));

        Ok(())
    }

    #[test]
    fn percent_points_divides_by_one_hundred() -> TestResult {
        let percent = percent_points(Decimal::from(10));

        assert_eq!(percent_of_minor(&percent, 1_000_00)?, 100_00);

        Ok(())
    }

    #[test]
    fn discount_on_rounds_to_whole_units() -> TestResult {
        // 7.5% of ₹333 is ₹24.975
        let amount = Money::from_minor(333_00, INR);
        let percent = percent_points(Decimal::new(75, 1));

        let whole = discount_on(&amount, &percent, Precision::WholeUnits)?;
        let minor = discount_on(&amount, &percent, Precision::MinorUnits)?;

        assert_eq!(whole, Money::from_minor(25_00, INR));
        assert_eq!(minor, Money::from_minor(24_98, INR));

        Ok(())
    }

    #[test]
    fn discount_on_rounds_once_to_whole_units() -> TestResult {
        // 2.4495% of ₹1000 is ₹24.495: rounding to paise first would give ₹24.50 and then ₹25
        let amount = Money::from_minor(1_000_00, INR);
        let percent = percent_points(Decimal::new(24495, 4));

        assert_eq!(
            discount_on(&amount, &percent, Precision::WholeUnits)?,
            Money::from_minor(24_00, INR)
        );
        assert_eq!(
            discount_on(&amount, &percent, Precision::MinorUnits)?,
            Money::from_minor(24_50, INR)
        );

        Ok(())
    }
}
