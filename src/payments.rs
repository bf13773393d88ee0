//! Payment Methods
//!
//! Paying online earns a percentage off the amount due after any coupon.

use std::fmt;

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;

use crate::{
    discounts::{DiscountError, discount_on},
    pricing::Precision,
};

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Prepaid through the payment gateway.
    Online,

    /// Paid to the courier on delivery.
    CashOnDelivery,
}

impl PaymentMethod {
    /// Stable identifier, as stored on orders.
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Online => "online",
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which amount the online-payment discount is calculated on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PaymentDiscountBase {
    /// The amount left after the coupon discount, so the two discounts compound.
    #[default]
    AfterCoupon,

    /// The original subtotal, independent of any coupon.
    Subtotal,
}

/// Calculate the payment-method discount on `amount`.
///
/// Online payments get `round(amount × online_discount)`; every other method gets nothing.
///
/// # Errors
///
/// Returns a [`DiscountError`] if the percentage cannot be represented.
pub fn apply_payment_discount<'a>(
    amount: Money<'a, Currency>,
    method: PaymentMethod,
    online_discount: &Percentage,
    precision: Precision,
) -> Result<Money<'a, Currency>, DiscountError> {
    match method {
        PaymentMethod::Online => discount_on(&amount, online_discount, precision),
        PaymentMethod::CashOnDelivery => Ok(Money::from_minor(0, amount.currency())),
    }
}
