//! Coupons
//!
//! Admin-managed discount codes. Applying a coupon only reads it; usage is counted when an order
//! is placed, through [`CouponService::record_redemption`](crate::services::CouponService).

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    discounts::{DiscountError, discount_on, percent_points},
    pricing::Precision,
};

/// Errors applying or defining a coupon.
#[derive(Debug, Error, PartialEq)]
pub enum CouponError {
    /// The cart total is below the coupon's minimum.
    #[error("add {shortfall} more to use coupon {code}")]
    NotEligible {
        /// Coupon code
        code: CouponCode,
        /// Amount still needed to reach the minimum
        shortfall: String,
    },

    /// The coupon's usage limit has been reached.
    #[error("coupon {0} has expired")]
    Expired(CouponCode),

    /// The coupon was switched off by an admin.
    #[error("coupon {0} is not active")]
    Inactive(CouponCode),

    /// An empty code was entered.
    #[error("coupon code is empty")]
    EmptyCode,

    /// A percentage outside 0–100 or a negative amount.
    #[error("invalid coupon value: {0}")]
    InvalidValue(String),

    /// Discount arithmetic failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A coupon code, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CouponCode(String);

impl CouponCode {
    /// Normalise a code as typed by a shopper or admin.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::EmptyCode`] if nothing but whitespace was entered.
    pub fn parse(code: &str) -> Result<Self, CouponError> {
        let trimmed = code.trim();

        if trimmed.is_empty() {
            return Err(CouponError::EmptyCode);
        }

        Ok(Self(trimmed.to_uppercase()))
    }

    /// Normalised code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a coupon discounts the cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CouponDiscount<'a> {
    /// A percentage of the subtotal.
    Percentage(Percentage),

    /// A fixed amount, never more than the subtotal.
    Fixed(Money<'a, Currency>),
}

impl<'a> CouponDiscount<'a> {
    /// Percentage discount from percent points, e.g. `10` for 10% off.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::InvalidValue`] unless `0 ≤ points ≤ 100`.
    pub fn percent(points: Decimal) -> Result<Self, CouponError> {
        if points < Decimal::ZERO || points > Decimal::ONE_HUNDRED {
            return Err(CouponError::InvalidValue(format!("{points}%")));
        }

        Ok(Self::Percentage(percent_points(points)))
    }

    /// Fixed amount off.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::InvalidValue`] if `amount` is negative.
    pub fn fixed(amount: Money<'a, Currency>) -> Result<Self, CouponError> {
        if amount.to_minor_units() < 0 {
            return Err(CouponError::InvalidValue(amount.to_string()));
        }

        Ok(Self::Fixed(amount))
    }
}

/// Coupon
#[derive(Debug, Clone)]
pub struct Coupon<'a> {
    code: CouponCode,
    discount: CouponDiscount<'a>,
    min_cart_total: Option<Money<'a, Currency>>,
    max_discount: Option<Money<'a, Currency>>,
    usage_limit: Option<u32>,
    times_used: u32,
    active: bool,
}

impl<'a> Coupon<'a> {
    /// Create an active, unlimited coupon.
    pub fn new(code: CouponCode, discount: CouponDiscount<'a>) -> Self {
        Self {
            code,
            discount,
            min_cart_total: None,
            max_discount: None,
            usage_limit: None,
            times_used: 0,
            active: true,
        }
    }

    /// Require a minimum cart subtotal.
    #[must_use]
    pub fn with_min_cart_total(mut self, minimum: Money<'a, Currency>) -> Self {
        self.min_cart_total = Some(minimum);
        self
    }

    /// Cap the discount a percentage coupon can give.
    #[must_use]
    pub fn with_max_discount(mut self, cap: Money<'a, Currency>) -> Self {
        self.max_discount = Some(cap);
        self
    }

    /// Limit how many orders may use the coupon.
    #[must_use]
    pub fn with_usage_limit(mut self, limit: u32) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    /// Record prior usage.
    #[must_use]
    pub fn with_times_used(mut self, times_used: u32) -> Self {
        self.times_used = times_used;
        self
    }

    /// Switch the coupon off.
    #[must_use]
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// Coupon code.
    pub fn code(&self) -> &CouponCode {
        &self.code
    }

    /// Discount definition.
    pub fn discount(&self) -> &CouponDiscount<'a> {
        &self.discount
    }

    /// Minimum cart subtotal, if any.
    pub fn min_cart_total(&self) -> Option<Money<'a, Currency>> {
        self.min_cart_total
    }

    /// Usage limit, if any.
    pub fn usage_limit(&self) -> Option<u32> {
        self.usage_limit
    }

    /// Number of orders that have used the coupon.
    pub fn times_used(&self) -> u32 {
        self.times_used
    }

    /// Whether the coupon is switched on.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the usage limit has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .is_some_and(|limit| self.times_used >= limit)
    }

    /// Count one more use.
    pub(crate) fn record_use(&mut self) {
        self.times_used = self.times_used.saturating_add(1);
    }
}

/// The result of applying a coupon to a subtotal.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedCoupon<'a> {
    /// Coupon code
    pub code: CouponCode,

    /// Amount taken off the subtotal
    pub discount_amount: Money<'a, Currency>,
}

/// Apply a coupon to a cart subtotal.
///
/// Percentage coupons take `round(subtotal × percent)`, capped by the coupon's maximum discount;
/// fixed coupons take `min(amount, subtotal)`. The discount never exceeds the subtotal.
///
/// # Errors
///
/// - [`CouponError::Inactive`]: the coupon is switched off.
/// - [`CouponError::NotEligible`]: `subtotal` is below the coupon minimum.
/// - [`CouponError::Expired`]: the usage limit has been reached.
/// - [`CouponError::Money`] / [`CouponError::Discount`]: currency mismatch or arithmetic failure.
pub fn apply_coupon<'a>(
    subtotal: Money<'a, Currency>,
    coupon: &Coupon<'a>,
    precision: Precision,
) -> Result<AppliedCoupon<'a>, CouponError> {
    if !coupon.active {
        return Err(CouponError::Inactive(coupon.code.clone()));
    }

    if let Some(minimum) = coupon.min_cart_total {
        let shortfall = minimum.sub(subtotal)?;

        if shortfall.to_minor_units() > 0 {
            return Err(CouponError::NotEligible {
                code: coupon.code.clone(),
                shortfall: shortfall.to_string(),
            });
        }
    }

    if coupon.is_exhausted() {
        return Err(CouponError::Expired(coupon.code.clone()));
    }

    let discount = match coupon.discount {
        CouponDiscount::Percentage(percent) => {
            let discount = discount_on(&subtotal, &percent, precision)?;

            match coupon.max_discount {
                Some(cap) if cap.to_minor_units() < discount.to_minor_units() => cap,
                _ => discount,
            }
        }
        CouponDiscount::Fixed(amount) => {
            if amount.currency() != subtotal.currency() {
                return Err(MoneyError::CurrencyMismatch {
                    expected: subtotal.currency().iso_alpha_code,
                    actual: amount.currency().iso_alpha_code,
                }
                .into());
            }

            amount
        }
    };

    let clamped = discount
        .to_minor_units()
        .clamp(0, subtotal.to_minor_units().max(0));

    Ok(AppliedCoupon {
        code: coupon.code.clone(),
        discount_amount: Money::from_minor(clamped, subtotal.currency()),
    })
}
