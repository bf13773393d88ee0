//! Catalog
//!
//! Products keyed by [`ProductKey`], with a slug index for lookups from carts and fixture files.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    items::{LineItem, SelectedOption},
    products::{Product, ProductError, ProductKey},
};

/// Errors building line items from the catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// No product is stored under this key.
    #[error("product not found")]
    MissingProduct(ProductKey),

    /// No product is registered under this slug.
    #[error("product not found: {0}")]
    UnknownSlug(String),

    /// A slug was registered twice.
    #[error("duplicate product slug: {0}")]
    DuplicateSlug(String),

    /// The product has no option group with this name.
    #[error("unknown option group: {0}")]
    UnknownOption(String),

    /// The option group has no such choice (group, choice).
    #[error("option group {0} has no choice {1}")]
    UnknownChoice(String, String),

    /// Product price resolution failed.
    #[error(transparent)]
    Product(#[from] ProductError),
}

/// Catalog
#[derive(Debug, Default)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    slugs: FxHashMap<String, ProductKey>,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            products: SlotMap::with_key(),
            slugs: FxHashMap::default(),
        }
    }

    /// Add a product under `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateSlug`] if the slug is taken.
    pub fn insert(
        &mut self,
        slug: impl Into<String>,
        product: Product<'a>,
    ) -> Result<ProductKey, CatalogError> {
        let slug = slug.into();

        if self.slugs.contains_key(&slug) {
            return Err(CatalogError::DuplicateSlug(slug));
        }

        let key = self.products.insert(product);
        self.slugs.insert(slug, key);

        Ok(key)
    }

    /// Get a product by key.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingProduct`] if the key is unknown.
    pub fn product(&self, key: ProductKey) -> Result<&Product<'a>, CatalogError> {
        self.products
            .get(key)
            .ok_or(CatalogError::MissingProduct(key))
    }

    /// Find a product key by slug.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownSlug`] if no product has this slug.
    pub fn find(&self, slug: &str) -> Result<ProductKey, CatalogError> {
        self.slugs
            .get(slug)
            .copied()
            .ok_or_else(|| CatalogError::UnknownSlug(slug.to_string()))
    }

    /// Iterate over products.
    pub fn iter(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>)> {
        self.products.iter()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Build a priced line item for `quantity` units of a product.
    ///
    /// `selections` pairs option group names with chosen values; the product's unit price and
    /// each option's delta are resolved here, once.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the product, variant, option group or choice is unknown,
    /// or the quantity is zero.
    pub fn line_item(
        &self,
        key: ProductKey,
        quantity: u32,
        variant: Option<&str>,
        selections: &[(&str, &str)],
    ) -> Result<LineItem<'a>, CatalogError> {
        let product = self.product(key)?;
        let unit_price = product.kind.unit_price(quantity, variant)?;

        let mut line = LineItem::new(key, quantity, unit_price);

        if let Some(variant) = variant {
            line = line.with_variant(product.kind.variant_label(variant).unwrap_or(variant));
        }

        let mut options: SmallVec<[SelectedOption<'a>; 3]> = SmallVec::new();

        for (group_name, choice) in selections {
            let group = product
                .option(group_name)
                .ok_or_else(|| CatalogError::UnknownOption((*group_name).to_string()))?;

            let (label, delta) = group.choice(choice).ok_or_else(|| {
                CatalogError::UnknownChoice(group.name().to_string(), (*choice).to_string())
            })?;

            options.push(SelectedOption {
                group: group.name().to_string(),
                choice: label.to_string(),
                delta,
            });
        }

        // Catalog spelling in group order, so equal configurations compare equal
        options.sort_by(|a, b| a.group.cmp(&b.group));

        Ok(options.into_iter().fold(line, LineItem::with_option))
    }

    /// Re-resolve a line's unit price for a new quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the product is gone or the quantity is zero.
    pub fn reprice(
        &self,
        line: &LineItem<'a>,
        quantity: u32,
    ) -> Result<LineItem<'a>, CatalogError> {
        let product = self.product(line.product())?;
        let unit_price = product.kind.unit_price(quantity, line.variant())?;

        Ok(line.repriced(quantity, unit_price))
    }
}
