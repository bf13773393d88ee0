//! Checkout
//!
//! The order-total pipeline: cart subtotal, then coupon discount, then payment-method discount,
//! then shipping.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    catalog::CatalogError,
    coupons::{Coupon, CouponCode, CouponError, apply_coupon},
    discounts::DiscountError,
    payments::{PaymentDiscountBase, PaymentMethod, apply_payment_discount},
    pricing::{LineTotalError, Precision},
    services::ServiceError,
    shipping::ShippingPolicy,
    tiers::TierError,
};

/// Errors raised while pricing or placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Malformed quantity or tier data.
    #[error(transparent)]
    Tier(#[from] TierError),

    /// Line total calculation failed.
    #[error(transparent)]
    LineTotal(#[from] LineTotalError),

    /// Cart update failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Catalog lookup failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Discount arithmetic failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The coupon could not be applied.
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// No coupon exists with this code.
    #[error("coupon {0} not found")]
    CouponNotFound(CouponCode),

    /// Orders need at least one line.
    #[error("cart is empty")]
    EmptyCart,

    /// The cart is priced in a different currency from the store.
    #[error("cart currency {0} does not match store currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// A backend service could not be reached or refused the request.
    #[error(transparent)]
    Network(#[from] ServiceError),
}

impl CheckoutError {
    /// Message to show the shopper, or `None` for errors that indicate a bug or bad data.
    pub fn user_message(&self) -> Option<String> {
        match self {
            CheckoutError::Coupon(
                error @ (CouponError::NotEligible { .. }
                | CouponError::Expired(_)
                | CouponError::Inactive(_)
                | CouponError::EmptyCode),
            ) => Some(error.to_string()),
            CheckoutError::CouponNotFound(code) => Some(format!("coupon {code} is not valid")),
            CheckoutError::EmptyCart => Some("your cart is empty".to_string()),
            CheckoutError::Network(_) => {
                Some("something went wrong, please try again".to_string())
            }
            _ => None,
        }
    }
}

/// Store-wide pricing settings.
#[derive(Debug, Clone, Copy)]
pub struct PricingPolicy<'a> {
    /// Store currency
    pub currency: &'static Currency,

    /// Rounding applied to every computed amount
    pub precision: Precision,

    /// Discount for paying online
    pub online_discount: Percentage,

    /// Amount the online discount is calculated on
    pub discount_base: PaymentDiscountBase,

    /// Shipping charges
    pub shipping: ShippingPolicy<'a>,
}

impl PricingPolicy<'static> {
    /// Whole-unit pricing with no online discount and free shipping.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            currency,
            precision: Precision::WholeUnits,
            online_discount: Percentage::from(Decimal::ZERO),
            discount_base: PaymentDiscountBase::AfterCoupon,
            shipping: ShippingPolicy::free(currency),
        }
    }
}

impl<'a> PricingPolicy<'a> {
    /// Set the online-payment discount.
    #[must_use]
    pub fn with_online_discount(mut self, percent: Percentage) -> Self {
        self.online_discount = percent;
        self
    }

    /// Set which amount the online discount is calculated on.
    #[must_use]
    pub fn with_discount_base(mut self, base: PaymentDiscountBase) -> Self {
        self.discount_base = base;
        self
    }

    /// Set the shipping policy.
    #[must_use]
    pub fn with_shipping(mut self, shipping: ShippingPolicy<'a>) -> Self {
        self.shipping = shipping;
        self
    }

    /// Set the rounding precision.
    #[must_use]
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }
}

/// Breakdown of what an order costs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotal<'a> {
    /// Sum of line totals
    pub subtotal: Money<'a, Currency>,

    /// Taken off by the coupon
    pub coupon_discount: Money<'a, Currency>,

    /// Taken off for the payment method
    pub payment_method_discount: Money<'a, Currency>,

    /// Added for shipping
    pub shipping_cost: Money<'a, Currency>,

    /// Amount payable
    pub final_total: Money<'a, Currency>,
}

impl<'a> OrderTotal<'a> {
    /// Total of both discounts.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the addition fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.coupon_discount.add(self.payment_method_discount)
    }
}

/// Price a cart for checkout.
///
/// The coupon is applied to the subtotal first. The online-payment discount is then calculated
/// on the post-coupon amount (or on the subtotal, per [`PricingPolicy::discount_base`]) and
/// never takes more than what remains. Shipping is added last.
///
/// # Errors
///
/// Returns a [`CheckoutError`] if the cart is in another currency, a line cannot be totalled,
/// or the coupon cannot be applied.
pub fn compute_order_total<'a>(
    cart: &Cart<'a>,
    coupon: Option<&Coupon<'a>>,
    method: PaymentMethod,
    policy: &PricingPolicy<'a>,
) -> Result<OrderTotal<'a>, CheckoutError> {
    if cart.currency() != policy.currency {
        return Err(CheckoutError::CurrencyMismatch(
            cart.currency().iso_alpha_code,
            policy.currency.iso_alpha_code,
        ));
    }

    let currency = policy.currency;
    let precision = policy.precision;

    let subtotal = cart.subtotal(precision)?;

    let coupon_discount = match coupon {
        Some(coupon) => apply_coupon(subtotal, coupon, precision)?.discount_amount,
        None => Money::from_minor(0, currency),
    };

    let after_coupon = subtotal.sub(coupon_discount)?;

    let discount_base = match policy.discount_base {
        PaymentDiscountBase::AfterCoupon => after_coupon,
        PaymentDiscountBase::Subtotal => subtotal,
    };

    let payment_method_discount = Money::from_minor(
        apply_payment_discount(discount_base, method, &policy.online_discount, precision)?
            .to_minor_units()
            .min(after_coupon.to_minor_units()),
        currency,
    );

    let merchandise = after_coupon.sub(payment_method_discount)?;
    let shipping_cost = policy.shipping.shipping_cost(merchandise, cart.is_empty());
    let final_total = merchandise.add(shipping_cost)?;

    Ok(OrderTotal {
        subtotal,
        coupon_discount,
        payment_method_discount,
        shipping_cost,
        final_total,
    })
}
