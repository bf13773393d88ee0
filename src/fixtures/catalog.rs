//! Catalog Fixtures

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, INR, USD},
};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    products::{OptionGroup, Product, ProductKind, VariantPrices},
    tiers::{PricingTier, TierSchedule},
};

/// Wrapper for the catalog in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Map of product slug -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product kinds as written in catalog files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindFixture {
    /// Priced per size
    AcrylicPhoto,

    /// Priced per size
    NamePlate,

    /// Priced per size
    Apparel,

    /// Priced by quantity tier
    QrStandee,

    /// Priced by quantity tier
    Trophy,

    /// Priced by quantity tier
    CorporateGift,

    /// Priced by quantity tier
    MagneticBadge,

    /// Priced by quantity tier
    NamePencil,

    /// Priced by quantity tier
    WallClock,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Product kind
    pub kind: KindFixture,

    /// Quantity tiers, for tiered kinds
    #[serde(default)]
    pub tiers: Vec<TierFixture>,

    /// Size variants, for sized kinds
    #[serde(default)]
    pub variants: Vec<PricedChoiceFixture>,

    /// Customisation option groups
    #[serde(default)]
    pub options: Vec<OptionFixture>,
}

/// Quantity tier, e.g. `{ min: 10, price: "99 INR" }`
#[derive(Debug, Deserialize)]
pub struct TierFixture {
    /// Minimum quantity
    pub min: u32,

    /// Unit price at this quantity (e.g., "99 INR")
    pub price: String,
}

/// A label with a price, used for variants and option choices
#[derive(Debug, Deserialize)]
pub struct PricedChoiceFixture {
    /// Variant or choice label
    pub label: String,

    /// Price or per-unit delta (e.g., "50 INR")
    pub price: String,
}

/// Option group fixture
#[derive(Debug, Deserialize)]
pub struct OptionFixture {
    /// Group name
    pub name: String,

    /// Available choices
    pub choices: Vec<PricedChoiceFixture>,
}

impl ProductFixture {
    /// Build the product, checking every price against the fixture set's currency.
    ///
    /// # Errors
    ///
    /// Returns an error if a price is malformed or in another currency, the kind is given the
    /// wrong pricing section, or the pricing data is invalid.
    pub fn try_into_product(
        self,
        slug: &str,
        currency: &mut Option<&'static Currency>,
    ) -> Result<Product<'static>, FixtureError> {
        let kind = match self.kind {
            KindFixture::AcrylicPhoto | KindFixture::NamePlate | KindFixture::Apparel => {
                if !self.tiers.is_empty() {
                    return Err(FixtureError::InvalidProduct(format!(
                        "{slug}: {:?} products are priced by variant, not by tier",
                        self.kind
                    )));
                }

                let variants = VariantPrices::new(
                    self.variants
                        .into_iter()
                        .map(|variant| Ok((variant.label, parse_money(&variant.price, currency)?)))
                        .collect::<Result<Vec<_>, FixtureError>>()?,
                )?;

                match self.kind {
                    KindFixture::AcrylicPhoto => ProductKind::AcrylicPhoto(variants),
                    KindFixture::NamePlate => ProductKind::NamePlate(variants),
                    _ => ProductKind::Apparel(variants),
                }
            }
            tiered => {
                if !self.variants.is_empty() {
                    return Err(FixtureError::InvalidProduct(format!(
                        "{slug}: {tiered:?} products are priced by tier, not by variant"
                    )));
                }

                let schedule = TierSchedule::new(
                    self.tiers
                        .into_iter()
                        .map(|tier| Ok(PricingTier::new(tier.min, parse_money(&tier.price, currency)?)))
                        .collect::<Result<Vec<_>, FixtureError>>()?,
                )?;

                match tiered {
                    KindFixture::QrStandee => ProductKind::QrStandee(schedule),
                    KindFixture::Trophy => ProductKind::Trophy(schedule),
                    KindFixture::CorporateGift => ProductKind::CorporateGift(schedule),
                    KindFixture::MagneticBadge => ProductKind::MagneticBadge(schedule),
                    KindFixture::NamePencil => ProductKind::NamePencil(schedule),
                    _ => ProductKind::WallClock(schedule),
                }
            }
        };

        let mut product = Product::new(self.name, kind);

        for option in self.options {
            let choices = option
                .choices
                .into_iter()
                .map(|choice| Ok((choice.label, parse_money(&choice.price, currency)?)))
                .collect::<Result<Vec<_>, FixtureError>>()?;

            product = product.with_option(OptionGroup::new(option.name, choices)?);
        }

        Ok(product)
    }
}

/// Parse a price and check it against the currency already seen, adopting it if none has been.
///
/// # Errors
///
/// Returns an error if the price is malformed or in a different currency.
pub fn parse_money(
    s: &str,
    currency: &mut Option<&'static Currency>,
) -> Result<Money<'static, Currency>, FixtureError> {
    let (minor_units, parsed) = parse_price(s)?;

    match *currency {
        Some(existing) if existing != parsed => {
            return Err(FixtureError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                parsed.iso_alpha_code.to_string(),
            ));
        }
        Some(_) => {}
        None => *currency = Some(parsed),
    }

    Ok(Money::from_minor(minor_units, parsed))
}

/// Parse price string (e.g., "299 INR") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "INR" => INR,
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    let minor_units = amount
        .checked_mul(Decimal::from(10_i64.pow(currency.exponent)))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse percentage string (e.g., "10%" or "0.10") into a `Percentage`
///
/// # Errors
///
/// Returns an error if the string cannot be parsed.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    let fraction = if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?
            / Decimal::ONE_HUNDRED
    } else {
        trimmed
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?
    };

    Ok(Percentage::from(fraction))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::products::ProductError;

    use super::*;

    #[test]
    fn parse_price_reads_rupees() -> Result<(), FixtureError> {
        let (minor, currency) = parse_price("129 INR")?;

        assert_eq!(minor, 129_00);
        assert_eq!(currency, INR);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99INR");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_money_rejects_second_currency() -> TestResult {
        let mut currency = None;

        parse_money("10 INR", &mut currency)?;

        let result = parse_money("10 GBP", &mut currency);

        assert!(matches!(
            result,
            Err(FixtureError::CurrencyMismatch(expected, found)) if expected == "INR" && found == "GBP"
        ));

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_both_formats() -> Result<(), FixtureError> {
        assert_eq!(parse_percentage("10%")?, parse_percentage("0.10")?);
        assert_eq!(parse_percentage("  7.5%  ")?, Percentage::from(Decimal::new(75, 3)));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_invalid_format() {
        let result = parse_percentage("ten");

        assert!(matches!(result, Err(FixtureError::InvalidPercentage(_))));
    }

    #[test]
    fn tiered_product_from_yaml() -> TestResult {
        let fixture: ProductFixture = serde_norway::from_str(
            r#"
name: QR Standee
kind: qr_standee
tiers:
  - { min: 1, price: "299 INR" }
  - { min: 5, price: "129 INR" }
options:
  - name: Finish
    choices:
      - { label: Gloss, price: "20 INR" }
"#,
        )?;

        let mut currency = None;
        let product = fixture.try_into_product("qr-standee", &mut currency)?;

        assert_eq!(product.kind.as_str(), "qr_standee");
        assert_eq!(product.kind.unit_price(7, None)?, Money::from_minor(129_00, INR));
        assert_eq!(
            product.option("finish").and_then(|group| group.delta("gloss")),
            Some(Money::from_minor(20_00, INR))
        );
        assert_eq!(currency, Some(INR));

        Ok(())
    }

    #[test]
    fn sized_product_requires_variant() -> TestResult {
        let fixture: ProductFixture = serde_norway::from_str(
            r#"
name: Acrylic Photo
kind: acrylic_photo
variants:
  - { label: 8x6, price: "499 INR" }
"#,
        )?;

        let product = fixture.try_into_product("acrylic-photo", &mut None)?;

        assert_eq!(
            product.kind.unit_price(1, None),
            Err(ProductError::VariantRequired)
        );

        Ok(())
    }

    #[test]
    fn wrong_pricing_section_is_rejected() -> TestResult {
        let fixture: ProductFixture = serde_norway::from_str(
            r#"
name: Trophy
kind: trophy
variants:
  - { label: Small, price: "499 INR" }
"#,
        )?;

        let result = fixture.try_into_product("trophy", &mut None);

        assert!(matches!(result, Err(FixtureError::InvalidProduct(_))));

        Ok(())
    }
}
