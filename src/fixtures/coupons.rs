//! Coupon Fixtures

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    coupons::{Coupon, CouponCode, CouponDiscount},
    fixtures::{
        FixtureError,
        catalog::{parse_money, parse_percentage},
    },
};

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Coupons in the set
    pub coupons: Vec<CouponFixture>,
}

/// Coupon discount types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponTypeFixture {
    /// `value` is a percentage, e.g. "10%"
    Percentage,

    /// `value` is an amount, e.g. "150 INR"
    Fixed,
}

/// Coupon Fixture
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Code shoppers type in
    pub code: String,

    /// Discount type
    #[serde(rename = "type")]
    pub kind: CouponTypeFixture,

    /// Discount value
    pub value: String,

    /// Minimum cart subtotal (e.g., "500 INR")
    #[serde(default)]
    pub min_cart_total: Option<String>,

    /// Cap on a percentage discount (e.g., "250 INR")
    #[serde(default)]
    pub max_discount: Option<String>,

    /// Maximum number of orders
    #[serde(default)]
    pub usage_limit: Option<u32>,

    /// Orders that have already used it
    #[serde(default)]
    pub times_used: u32,

    /// Whether the coupon is switched on
    #[serde(default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool {
    true
}

impl CouponFixture {
    /// Build the coupon, checking amounts against the fixture set's currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the code, value or an amount is invalid.
    pub fn try_into_coupon(
        self,
        currency: &mut Option<&'static Currency>,
    ) -> Result<Coupon<'static>, FixtureError> {
        let code = CouponCode::parse(&self.code)?;

        let discount = match self.kind {
            CouponTypeFixture::Percentage => {
                let fraction = parse_percentage(&self.value)? * Decimal::ONE;

                CouponDiscount::percent(fraction * Decimal::ONE_HUNDRED)?
            }
            CouponTypeFixture::Fixed => CouponDiscount::fixed(parse_money(&self.value, currency)?)?,
        };

        let mut coupon = Coupon::new(code, discount).with_times_used(self.times_used);

        if let Some(minimum) = &self.min_cart_total {
            coupon = coupon.with_min_cart_total(parse_money(minimum, currency)?);
        }

        if let Some(cap) = &self.max_discount {
            coupon = coupon.with_max_discount(parse_money(cap, currency)?);
        }

        if let Some(limit) = self.usage_limit {
            coupon = coupon.with_usage_limit(limit);
        }

        if !self.active {
            coupon = coupon.deactivated();
        }

        Ok(coupon)
    }
}
