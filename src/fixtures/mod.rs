//! Fixtures

use std::{fs, path::PathBuf};

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    catalog::{Catalog, CatalogError},
    coupons::{Coupon, CouponCode, CouponError},
    fixtures::{carts::CartFixture, catalog::CatalogFixture, coupons::CouponsFixture},
    products::{Product, ProductError, ProductKey},
    tiers::TierError,
};

pub mod carts;
pub mod catalog;
pub mod coupons;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between prices
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Product declared with the wrong pricing section for its kind
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    /// Coupon not found
    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    /// No prices loaded yet
    #[error("No prices loaded yet; currency unknown")]
    NoCurrency,

    /// No cart loaded
    #[error("No cart loaded")]
    NoCart,

    /// Invalid product pricing
    #[error(transparent)]
    Product(#[from] ProductError),

    /// Invalid tier schedule
    #[error(transparent)]
    Tier(#[from] TierError),

    /// Catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Invalid coupon
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Products keyed by slug
    catalog: Catalog<'static>,

    /// Coupons in file order
    coupons: Vec<Coupon<'static>>,

    /// Cart built from the loaded lines
    cart: Option<Cart<'static>>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: Catalog::new(),
            coupons: Vec::new(),
            cart: None,
            currency: None,
        }
    }

    fn read(&self, category: &str, name: &str) -> Result<String, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));

        Ok(fs::read_to_string(&file_path)?)
    }

    /// Load the catalog from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a product is invalid, or prices
    /// use more than one currency.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CatalogFixture = serde_norway::from_str(&self.read("catalog", name)?)?;

        let mut products: Vec<(String, Product<'static>)> = fixture
            .products
            .into_iter()
            .map(|(slug, product)| {
                let product = product.try_into_product(&slug, &mut self.currency)?;

                Ok((slug, product))
            })
            .collect::<Result<_, FixtureError>>()?;

        // Stable slot order regardless of map iteration order
        products.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (slug, product) in products {
            self.catalog.insert(slug, product)?;
        }

        Ok(self)
    }

    /// Load coupons from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a coupon is invalid.
    pub fn load_coupons(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CouponsFixture = serde_norway::from_str(&self.read("coupons", name)?)?;

        for coupon in fixture.coupons {
            let coupon = coupon.try_into_coupon(&mut self.currency)?;

            self.coupons.push(coupon);
        }

        Ok(self)
    }

    /// Load a cart from a YAML fixture file, pricing each line from the loaded catalog.
    ///
    /// Lines with the same configuration are merged, as they would be in a shopper's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, no catalog has been loaded, or a
    /// line references an unknown product, variant or option.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CartFixture = serde_norway::from_str(&self.read("carts", name)?)?;
        let currency = self.currency.ok_or(FixtureError::NoCurrency)?;

        let mut cart = Cart::new(currency);

        for line in &fixture.lines {
            let key = self.catalog.find(&line.product)?;
            let item = self.catalog.line_item(
                key,
                line.quantity,
                line.variant.as_deref(),
                &line.selections(),
            )?;

            cart.add(item, &self.catalog)?;
        }

        self.cart = Some(cart);

        Ok(self)
    }

    /// Load a complete fixture set (catalog, coupons and cart with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_set(name)?;

        Ok(fixture)
    }

    /// Load catalog, coupons and cart with the same name from this fixture's base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_set(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        self.load_catalog(name)?
            .load_coupons(name)?
            .load_cart(name)
    }

    /// Get the catalog
    pub fn catalog(&self) -> &Catalog<'static> {
        &self.catalog
    }

    /// Get a product key by its slug
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_key(&self, slug: &str) -> Result<ProductKey, FixtureError> {
        Ok(self.catalog.find(slug)?)
    }

    /// Get all coupons
    pub fn coupons(&self) -> &[Coupon<'static>] {
        &self.coupons
    }

    /// Get a coupon by code, matched the way shoppers type it
    ///
    /// # Errors
    ///
    /// Returns an error if the code is malformed or no coupon has it.
    pub fn coupon(&self, code: &str) -> Result<&Coupon<'static>, FixtureError> {
        let code = CouponCode::parse(code)?;

        self.coupons
            .iter()
            .find(|coupon| coupon.code() == &code)
            .ok_or_else(|| FixtureError::CouponNotFound(code.to_string()))
    }

    /// Get the loaded cart
    ///
    /// # Errors
    ///
    /// Returns an error if no cart has been loaded.
    pub fn cart(&self) -> Result<&Cart<'static>, FixtureError> {
        self.cart.as_ref().ok_or(FixtureError::NoCart)
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no prices have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use rusty_money::{Money, iso::INR};
    use tempfile::tempdir;
    use testresult::TestResult;

    use super::*;

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    const CATALOG: &str = r#"
products:
  qr-standee:
    name: QR Standee
    kind: qr_standee
    tiers:
      - { min: 1, price: "299 INR" }
      - { min: 2, price: "149 INR" }
      - { min: 5, price: "129 INR" }
      - { min: 10, price: "99 INR" }
  acrylic-photo:
    name: Acrylic Photo
    kind: acrylic_photo
    variants:
      - { label: 8x6, price: "499 INR" }
    options:
      - name: Finish
        choices:
          - { label: Gloss, price: "0 INR" }
          - { label: Matte, price: "50 INR" }
"#;

    #[test]
    fn fixture_loads_catalog_coupons_and_cart() -> TestResult {
        let dir = tempdir()?;

        write_fixture(dir.path(), "catalog", "shop", CATALOG)?;
        write_fixture(
            dir.path(),
            "coupons",
            "shop",
            "coupons:\n  - { code: SAVE10, type: percentage, value: \"10%\", min_cart_total: \"500 INR\" }\n",
        )?;
        write_fixture(
            dir.path(),
            "carts",
            "shop",
            r"
lines:
  - { product: qr-standee, quantity: 4 }
  - { product: qr-standee, quantity: 3 }
  - { product: acrylic-photo, quantity: 1, variant: 8x6, options: { Finish: Matte } }
",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_set("shop")?;

        assert_eq!(fixture.catalog().len(), 2);
        assert_eq!(fixture.currency()?, INR);
        assert!(fixture.coupon("save10")?.is_active());

        let cart = fixture.cart()?;

        // 4 + 3 standees merge into one line priced at the 5+ tier
        assert_eq!(cart.len(), 2);
        assert_eq!(
            cart.subtotal(crate::pricing::Precision::WholeUnits)?,
            Money::from_minor(903_00 + 549_00, INR)
        );

        Ok(())
    }

    #[test]
    fn cart_needs_catalog_first() -> TestResult {
        let dir = tempdir()?;

        write_fixture(dir.path(), "carts", "shop", "lines: []\n")?;

        let result = Fixture::with_base_path(dir.path()).load_cart("shop").map(|_| ());

        assert!(matches!(result, Err(FixtureError::NoCurrency)));

        Ok(())
    }

    #[test]
    fn cart_with_unknown_product_fails() -> TestResult {
        let dir = tempdir()?;

        write_fixture(dir.path(), "catalog", "shop", CATALOG)?;
        write_fixture(
            dir.path(),
            "carts",
            "shop",
            "lines:\n  - { product: mug, quantity: 1 }\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        let result = fixture.load_catalog("shop")?.load_cart("shop").map(|_| ());

        assert!(matches!(
            result,
            Err(FixtureError::Catalog(CatalogError::UnknownSlug(slug))) if slug == "mug"
        ));

        Ok(())
    }

    #[test]
    fn coupon_lookup_reports_missing_code() -> TestResult {
        let fixture = Fixture::new();

        assert!(matches!(
            fixture.coupon("nope"),
            Err(FixtureError::CouponNotFound(code)) if code == "NOPE"
        ));

        Ok(())
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut fixture = Fixture::with_base_path("/nonexistent/fixtures");

        assert!(matches!(
            fixture.load_catalog("shop").map(|_| ()),
            Err(FixtureError::Io(_))
        ));
    }

    #[test]
    fn bundled_storefront_set_loads() -> TestResult {
        let fixture = Fixture::from_set("storefront")?;

        assert!(!fixture.catalog().is_empty());
        assert!(!fixture.coupons().is_empty());
        assert!(!fixture.cart()?.is_empty());

        Ok(())
    }
}
