//! Products
//!
//! Every product carries an explicit [`ProductKind`] holding the pricing schema for that kind of
//! product, decided once when the catalog is loaded.

use std::fmt;

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;
use smallvec::SmallVec;
use thiserror::Error;

use crate::tiers::{TierError, TierSchedule};

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Errors resolving a product's price.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductError {
    /// Tier resolution failed.
    #[error(transparent)]
    Tier(#[from] TierError),

    /// A sized product was priced without choosing a variant.
    #[error("a variant must be chosen for this product")]
    VariantRequired,

    /// The chosen variant does not exist.
    #[error("unknown variant: {0}")]
    UnknownVariant(String),

    /// A variant list has no entries.
    #[error("at least one variant is required")]
    NoVariants,

    /// Two variants share a label.
    #[error("duplicate variant: {0}")]
    DuplicateVariant(String),

    /// A variant has a negative price.
    #[error("variant {0} has a negative price")]
    NegativePrice(String),

    /// An option group lists the same choice twice.
    #[error("option group {0} lists choice {1} more than once")]
    DuplicateChoice(String, String),
}

/// Size or format variants, each with its own price.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantPrices<'a> {
    variants: SmallVec<[(String, Money<'a, Currency>); 4]>,
}

impl<'a> VariantPrices<'a> {
    /// Create a variant price list. Labels are matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductError`] if the list is empty, a label repeats or a price is negative.
    pub fn new(
        variants: impl IntoIterator<Item = (String, Money<'a, Currency>)>,
    ) -> Result<Self, ProductError> {
        let mut collected: SmallVec<[(String, Money<'a, Currency>); 4]> = SmallVec::new();

        for (label, price) in variants {
            if price.to_minor_units() < 0 {
                return Err(ProductError::NegativePrice(label));
            }

            if collected
                .iter()
                .any(|(existing, _)| existing.eq_ignore_ascii_case(&label))
            {
                return Err(ProductError::DuplicateVariant(label));
            }

            collected.push((label, price));
        }

        if collected.is_empty() {
            return Err(ProductError::NoVariants);
        }

        Ok(Self {
            variants: collected,
        })
    }

    /// Price of the named variant.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::UnknownVariant`] if no variant has this label.
    pub fn price(&self, label: &str) -> Result<Money<'a, Currency>, ProductError> {
        self.get(label)
            .map(|(_, price)| price)
            .ok_or_else(|| ProductError::UnknownVariant(label.to_string()))
    }

    /// The variant matching `label`, with its label as listed in the catalog.
    pub fn get(&self, label: &str) -> Option<(&str, Money<'a, Currency>)> {
        self.variants
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(label))
            .map(|(existing, price)| (existing.as_str(), *price))
    }

    /// Variant labels in catalog order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|(label, _)| label.as_str())
    }

    /// Lowest variant price, shown as "from" pricing.
    pub fn starting_price(&self) -> Option<Money<'a, Currency>> {
        self.variants
            .iter()
            .map(|(_, price)| *price)
            .min_by_key(Money::to_minor_units)
    }
}

/// What a product is, and how it is priced.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductKind<'a> {
    /// Acrylic photo prints priced per size.
    AcrylicPhoto(VariantPrices<'a>),

    /// Name plates priced per size.
    NamePlate(VariantPrices<'a>),

    /// Apparel priced per size.
    Apparel(VariantPrices<'a>),

    /// QR code standees with bulk pricing.
    QrStandee(TierSchedule<'a>),

    /// Trophies with bulk pricing.
    Trophy(TierSchedule<'a>),

    /// Corporate gifts with bulk pricing.
    CorporateGift(TierSchedule<'a>),

    /// Magnetic badges with bulk pricing.
    MagneticBadge(TierSchedule<'a>),

    /// Personalised name pencils with bulk pricing.
    NamePencil(TierSchedule<'a>),

    /// Wall clocks with bulk pricing.
    WallClock(TierSchedule<'a>),
}

impl<'a> ProductKind<'a> {
    /// Resolve the unit price for an order of `quantity` units.
    ///
    /// Tiered kinds ignore `variant`; sized kinds require one.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductError`] if the quantity is zero, or the variant is missing or unknown.
    pub fn unit_price(
        &self,
        quantity: u32,
        variant: Option<&str>,
    ) -> Result<Money<'a, Currency>, ProductError> {
        if quantity == 0 {
            return Err(TierError::ZeroQuantity.into());
        }

        match self {
            ProductKind::AcrylicPhoto(variants)
            | ProductKind::NamePlate(variants)
            | ProductKind::Apparel(variants) => {
                variants.price(variant.ok_or(ProductError::VariantRequired)?)
            }
            ProductKind::QrStandee(schedule)
            | ProductKind::Trophy(schedule)
            | ProductKind::CorporateGift(schedule)
            | ProductKind::MagneticBadge(schedule)
            | ProductKind::NamePencil(schedule)
            | ProductKind::WallClock(schedule) => Ok(schedule.unit_price(quantity)?),
        }
    }

    /// Catalog spelling of a variant label. `None` for tiered kinds or unknown labels.
    pub fn variant_label(&self, variant: &str) -> Option<&str> {
        match self {
            ProductKind::AcrylicPhoto(variants)
            | ProductKind::NamePlate(variants)
            | ProductKind::Apparel(variants) => variants.get(variant).map(|(label, _)| label),
            _ => None,
        }
    }

    /// Lowest advertised unit price.
    pub fn starting_price(&self) -> Option<Money<'a, Currency>> {
        match self {
            ProductKind::AcrylicPhoto(variants)
            | ProductKind::NamePlate(variants)
            | ProductKind::Apparel(variants) => variants.starting_price(),
            ProductKind::QrStandee(schedule)
            | ProductKind::Trophy(schedule)
            | ProductKind::CorporateGift(schedule)
            | ProductKind::MagneticBadge(schedule)
            | ProductKind::NamePencil(schedule)
            | ProductKind::WallClock(schedule) => {
                schedule.tiers().last().map(|tier| tier.unit_price())
            }
        }
    }

    /// Stable identifier for the kind, as used in catalog files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::AcrylicPhoto(_) => "acrylic_photo",
            ProductKind::NamePlate(_) => "name_plate",
            ProductKind::Apparel(_) => "apparel",
            ProductKind::QrStandee(_) => "qr_standee",
            ProductKind::Trophy(_) => "trophy",
            ProductKind::CorporateGift(_) => "corporate_gift",
            ProductKind::MagneticBadge(_) => "magnetic_badge",
            ProductKind::NamePencil(_) => "name_pencil",
            ProductKind::WallClock(_) => "wall_clock",
        }
    }
}

impl fmt::Display for ProductKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customisation option group, e.g. "Finish" with "Gloss" and "Matte" choices.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionGroup<'a> {
    name: String,
    choices: SmallVec<[(String, Money<'a, Currency>); 4]>,
}

impl<'a> OptionGroup<'a> {
    /// Create an option group. Each choice carries a per-unit price delta.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::DuplicateChoice`] if a choice label repeats.
    pub fn new(
        name: impl Into<String>,
        choices: impl IntoIterator<Item = (String, Money<'a, Currency>)>,
    ) -> Result<Self, ProductError> {
        let name = name.into();
        let mut collected: SmallVec<[(String, Money<'a, Currency>); 4]> = SmallVec::new();

        for (label, delta) in choices {
            if collected
                .iter()
                .any(|(existing, _)| existing.eq_ignore_ascii_case(&label))
            {
                return Err(ProductError::DuplicateChoice(name, label));
            }

            collected.push((label, delta));
        }

        Ok(Self {
            name,
            choices: collected,
        })
    }

    /// Group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Per-unit price delta of a choice, matched case-insensitively.
    pub fn delta(&self, choice: &str) -> Option<Money<'a, Currency>> {
        self.choice(choice).map(|(_, delta)| delta)
    }

    /// A choice as listed in the catalog, with its delta, matched case-insensitively.
    pub fn choice(&self, choice: &str) -> Option<(&str, Money<'a, Currency>)> {
        self.choices
            .iter()
            .find(|(label, _)| label.eq_ignore_ascii_case(choice))
            .map(|(label, delta)| (label.as_str(), *delta))
    }
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Product name
    pub name: String,

    /// Product kind and pricing schema
    pub kind: ProductKind<'a>,

    /// Customisation options
    pub options: Vec<OptionGroup<'a>>,
}

impl<'a> Product<'a> {
    /// Create a product without customisation options.
    pub fn new(name: impl Into<String>, kind: ProductKind<'a>) -> Self {
        Self {
            name: name.into(),
            kind,
            options: Vec::new(),
        }
    }

    /// Add a customisation option group.
    #[must_use]
    pub fn with_option(mut self, group: OptionGroup<'a>) -> Self {
        self.options.push(group);
        self
    }

    /// Find an option group by name, case-insensitively.
    pub fn option(&self, name: &str) -> Option<&OptionGroup<'a>> {
        self.options
            .iter()
            .find(|group| group.name.eq_ignore_ascii_case(name))
    }
}
