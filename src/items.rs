//! Line Items

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    pricing::{LineTotalError, Precision, compute_line_total},
    products::ProductKey,
};

/// A customisation choice made for a line, with its per-unit price delta.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedOption<'a> {
    /// Option group name, e.g. "Finish"
    pub group: String,

    /// Chosen value, e.g. "Matte"
    pub choice: String,

    /// Price added to each unit
    pub delta: Money<'a, Currency>,
}

/// A product configuration at a resolved unit price.
///
/// Line items are values: changing the quantity produces a new line rather than mutating
/// one that may already have been copied into an order.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem<'a> {
    product: ProductKey,
    quantity: u32,
    unit_price: Money<'a, Currency>,
    variant: Option<String>,
    options: SmallVec<[SelectedOption<'a>; 3]>,
}

impl<'a> LineItem<'a> {
    /// Creates a new line with no variant or options.
    pub fn new(product: ProductKey, quantity: u32, unit_price: Money<'a, Currency>) -> Self {
        Self {
            product,
            quantity,
            unit_price,
            variant: None,
            options: SmallVec::new(),
        }
    }

    /// Set the chosen variant.
    #[must_use]
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Add a selected option.
    #[must_use]
    pub fn with_option(mut self, option: SelectedOption<'a>) -> Self {
        self.options.push(option);
        self
    }

    /// Returns the product this line is for
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Returns the quantity ordered
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the resolved unit price, before option deltas
    pub fn unit_price(&self) -> Money<'a, Currency> {
        self.unit_price
    }

    /// Returns the chosen variant, if any
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Returns the selected options
    pub fn options(&self) -> &[SelectedOption<'a>] {
        &self.options
    }

    /// Whether `other` is the same product configured the same way.
    ///
    /// Variant and option labels compare case-insensitively, options in any order.
    pub fn same_configuration(&self, other: &LineItem<'_>) -> bool {
        let same_variant = match (&self.variant, &other.variant) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        };

        self.product == other.product
            && same_variant
            && self.options.len() == other.options.len()
            && self.options.iter().all(|a| {
                other.options.iter().any(|b| {
                    a.group.eq_ignore_ascii_case(&b.group)
                        && a.choice.eq_ignore_ascii_case(&b.choice)
                })
            })
    }

    /// A copy of this line with a different quantity and re-resolved unit price.
    #[must_use]
    pub fn repriced(&self, quantity: u32, unit_price: Money<'a, Currency>) -> Self {
        Self {
            quantity,
            unit_price,
            ..self.clone()
        }
    }

    /// Line total: `(unit price + option deltas) × quantity`.
    ///
    /// # Errors
    ///
    /// Returns a [`LineTotalError`] if the quantity is zero, currencies differ or the total
    /// overflows.
    pub fn total(&self, precision: Precision) -> Result<Money<'a, Currency>, LineTotalError> {
        let deltas: SmallVec<[Money<'a, Currency>; 3]> =
            self.options.iter().map(|option| option.delta).collect();

        compute_line_total(self.unit_price, self.quantity, &deltas, precision)
    }
}
