//! Configuration
//!
//! Command line and environment settings for the checkout binary.

use std::path::PathBuf;

use clap::{Args, Parser};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

use crate::{
    checkout::PricingPolicy,
    discounts::percent_points,
    payments::{PaymentDiscountBase, PaymentMethod},
    pricing::Precision,
    shipping::ShippingPolicy,
};

/// Errors turning settings into a pricing policy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Currency code not in the ISO table.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Discount percent outside 0 to 100.
    #[error("online discount must be between 0 and 100 percent, got {0}")]
    DiscountOutOfRange(Decimal),

    /// Negative or unrepresentable amount.
    #[error("invalid amount for {0}: {1}")]
    InvalidAmount(&'static str, Decimal),
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Store pricing settings.
#[derive(Debug, Args)]
pub struct PricingConfig {
    /// Store currency (ISO 4217 code)
    #[arg(long, env = "STORE_CURRENCY", default_value = "INR")]
    pub currency: String,

    /// Rounding applied to computed amounts
    #[arg(long, env = "PRICE_PRECISION", value_enum, default_value_t = Precision::WholeUnits)]
    pub precision: Precision,

    /// Percent off for paying online
    #[arg(long, env = "ONLINE_DISCOUNT_PERCENT", default_value = "10")]
    pub online_discount_percent: Decimal,

    /// Amount the online discount is calculated on
    #[arg(long, env = "ONLINE_DISCOUNT_BASE", value_enum, default_value_t = PaymentDiscountBase::AfterCoupon)]
    pub discount_base: PaymentDiscountBase,

    /// Flat shipping fee, in whole currency units
    #[arg(long, env = "SHIPPING_FEE", default_value = "0")]
    pub shipping_fee: Decimal,

    /// Orders at or above this amount ship free, in whole currency units
    #[arg(long, env = "FREE_SHIPPING_ABOVE")]
    pub free_shipping_above: Option<Decimal>,
}

impl PricingConfig {
    /// Validate the settings and build a pricing policy.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the currency is unknown, the discount is out of range, or an
    /// amount is negative.
    pub fn policy(&self) -> Result<PricingPolicy<'static>, ConfigError> {
        let currency = iso::find(&self.currency.to_uppercase())
            .ok_or_else(|| ConfigError::UnknownCurrency(self.currency.clone()))?;

        if self.online_discount_percent < Decimal::ZERO
            || self.online_discount_percent > Decimal::ONE_HUNDRED
        {
            return Err(ConfigError::DiscountOutOfRange(self.online_discount_percent));
        }

        let flat_fee = whole_units("shipping fee", self.shipping_fee, currency)?;
        let free_above = self
            .free_shipping_above
            .map(|amount| whole_units("free shipping threshold", amount, currency))
            .transpose()?;

        Ok(PricingPolicy::new(currency)
            .with_precision(self.precision)
            .with_online_discount(percent_points(self.online_discount_percent))
            .with_discount_base(self.discount_base)
            .with_shipping(ShippingPolicy {
                flat_fee,
                free_above,
            }))
    }
}

fn whole_units(
    name: &'static str,
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, ConfigError> {
    if amount < Decimal::ZERO {
        return Err(ConfigError::InvalidAmount(name, amount));
    }

    let minor = 10_i64
        .checked_pow(currency.exponent)
        .and_then(|scale| amount.checked_mul(Decimal::from(scale)))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or(ConfigError::InvalidAmount(name, amount))?;

    Ok(Money::from_minor(minor, currency))
}

/// Price and place the order described by a fixture set
#[derive(Debug, Parser)]
#[command(name = "printworks", about = "Price and place a storefront order", long_about = None)]
pub struct AppConfig {
    /// Directory holding catalog, coupons and carts fixture files
    #[arg(long, env = "FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Fixture set to load
    #[arg(short, long, env = "FIXTURE_SET", default_value = "storefront")]
    pub set: String,

    /// Coupon code to apply
    #[arg(short, long)]
    pub coupon: Option<String>,

    /// Payment method
    #[arg(long, value_enum, default_value_t = PaymentMethod::Online)]
    pub payment: PaymentMethod,

    /// Pricing settings
    #[command(flatten)]
    pub pricing: PricingConfig,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use super::*;

    fn parse(args: &[&str]) -> Result<AppConfig, clap::Error> {
        AppConfig::try_parse_from(std::iter::once("printworks").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_build_whole_unit_rupee_policy() -> TestResult {
        let config = parse(&[])?;
        let policy = config.pricing.policy()?;

        assert_eq!(policy.currency, INR);
        assert_eq!(policy.precision, Precision::WholeUnits);
        assert_eq!(policy.discount_base, PaymentDiscountBase::AfterCoupon);
        assert_eq!(policy.shipping, ShippingPolicy::free(INR));
        assert_eq!(config.payment, PaymentMethod::Online);

        Ok(())
    }

    #[test]
    fn shipping_flags_become_money() -> TestResult {
        let config = parse(&[
            "--shipping-fee",
            "79",
            "--free-shipping-above",
            "999",
            "--discount-base",
            "subtotal",
            "--payment",
            "cash-on-delivery",
        ])?;
        let policy = config.pricing.policy()?;

        assert_eq!(policy.shipping.flat_fee, Money::from_minor(79_00, INR));
        assert_eq!(policy.shipping.free_above, Some(Money::from_minor(999_00, INR)));
        assert_eq!(policy.discount_base, PaymentDiscountBase::Subtotal);
        assert_eq!(config.payment, PaymentMethod::CashOnDelivery);

        Ok(())
    }

    #[test]
    fn rejects_unknown_currency() -> TestResult {
        let config = parse(&["--currency", "XYZ"])?;

        assert_eq!(
            config.pricing.policy().map(|_| ()),
            Err(ConfigError::UnknownCurrency("XYZ".to_string()))
        );

        Ok(())
    }

    #[test]
    fn rejects_discount_over_100() -> TestResult {
        let config = parse(&["--online-discount-percent", "120"])?;

        assert_eq!(
            config.pricing.policy().map(|_| ()),
            Err(ConfigError::DiscountOutOfRange(Decimal::from(120)))
        );

        Ok(())
    }
}
