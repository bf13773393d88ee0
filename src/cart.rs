//! Cart
//!
//! A shopper's cart is an explicit value passed through checkout. Persisting it between visits
//! is the job of a [`CartRepository`].

use std::fmt;

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    catalog::{Catalog, CatalogError},
    items::LineItem,
    pricing::{LineTotalError, Precision, total_price},
    services::ServiceError,
};

/// Errors related to cart construction or updates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A line's currency differs from the cart currency (index, line currency, cart currency).
    #[error("Line {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line was not found in the cart.
    #[error("Line {0} not found")]
    LineNotFound(usize),

    /// Quantities start at one; remove the line instead.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// Combined quantity does not fit.
    #[error("quantity overflowed")]
    QuantityOverflow,

    /// Re-pricing from the catalog failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Identifies a shopper's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a new random session id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing id.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Cart
#[derive(Debug, Clone, PartialEq)]
pub struct Cart<'a> {
    lines: Vec<LineItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart in `currency`.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a new cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if there was a currency mismatch error.
    pub fn with_lines(
        lines: impl Into<Vec<LineItem<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let lines = lines.into();

        lines
            .iter()
            .enumerate()
            .try_for_each(|(i, line)| check_currency(i, line, currency))?;

        Ok(Cart { lines, currency })
    }

    /// Add a line. A line configured the same way as an existing one is merged into it and the
    /// combined quantity re-priced, so bulk tiers apply across both.
    ///
    /// Returns the index of the affected line.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` on currency mismatch, quantity overflow or catalog failure.
    pub fn add(&mut self, line: LineItem<'a>, catalog: &Catalog<'a>) -> Result<usize, CartError> {
        check_currency(self.lines.len(), &line, self.currency)?;

        if line.quantity() == 0 {
            return Err(CartError::ZeroQuantity);
        }

        let existing = self
            .lines
            .iter()
            .position(|existing| existing.same_configuration(&line));

        let Some(index) = existing else {
            self.lines.push(line);

            return Ok(self.lines.len() - 1);
        };

        let current = self
            .lines
            .get(index)
            .ok_or(CartError::LineNotFound(index))?;

        let quantity = current
            .quantity()
            .checked_add(line.quantity())
            .ok_or(CartError::QuantityOverflow)?;

        let merged = catalog.reprice(current, quantity)?;

        if let Some(slot) = self.lines.get_mut(index) {
            *slot = merged;
        }

        Ok(index)
    }

    /// Change a line's quantity, re-pricing it from the catalog.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if the line doesn't exist, the quantity is zero or re-pricing fails.
    pub fn update_quantity(
        &mut self,
        index: usize,
        quantity: u32,
        catalog: &Catalog<'a>,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        let slot = self
            .lines
            .get_mut(index)
            .ok_or(CartError::LineNotFound(index))?;

        *slot = catalog.reprice(slot, quantity)?;

        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::LineNotFound` if the line doesn't exist.
    pub fn remove(&mut self, index: usize) -> Result<LineItem<'a>, CartError> {
        if index >= self.lines.len() {
            return Err(CartError::LineNotFound(index));
        }

        Ok(self.lines.remove(index))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Calculate the subtotal of the cart.
    ///
    /// # Errors
    ///
    /// Returns a `LineTotalError` if there was a money arithmetic or currency mismatch error.
    pub fn subtotal(&self, precision: Precision) -> Result<Money<'a, Currency>, LineTotalError> {
        if self.is_empty() {
            return Ok(Money::from_minor(0, self.currency));
        }

        total_price(&self.lines, precision)
    }

    /// Get a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::LineNotFound` if the line is not found.
    pub fn get_line(&self, index: usize) -> Result<&LineItem<'a>, CartError> {
        self.lines.get(index).ok_or(CartError::LineNotFound(index))
    }

    /// Lines in the order they were added.
    pub fn lines(&self) -> &[LineItem<'a>] {
        &self.lines
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

fn check_currency(
    index: usize,
    line: &LineItem<'_>,
    currency: &'static Currency,
) -> Result<(), CartError> {
    let line_currency = line.unit_price().currency();

    if line_currency == currency {
        Ok(())
    } else {
        Err(CartError::CurrencyMismatch(
            index,
            line_currency.iso_alpha_code,
            currency.iso_alpha_code,
        ))
    }
}

/// Storage for carts between requests.
#[automock]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Load the cart for a session, if one was saved.
    async fn load(&self, session: SessionId) -> Result<Option<Cart<'static>>, ServiceError>;

    /// Save the cart for a session, replacing any previous one.
    async fn save(&self, session: SessionId, cart: Cart<'static>) -> Result<(), ServiceError>;

    /// Forget the cart for a session.
    async fn clear(&self, session: SessionId) -> Result<(), ServiceError>;
}

/// Process-local cart storage.
#[derive(Debug, Default)]
pub struct InMemoryCartRepository {
    carts: RwLock<FxHashMap<SessionId, Cart<'static>>>,
}

impl InMemoryCartRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn load(&self, session: SessionId) -> Result<Option<Cart<'static>>, ServiceError> {
        Ok(self.carts.read().await.get(&session).cloned())
    }

    async fn save(&self, session: SessionId, cart: Cart<'static>) -> Result<(), ServiceError> {
        self.carts.write().await.insert(session, cart);

        Ok(())
    }

    async fn clear(&self, session: SessionId) -> Result<(), ServiceError> {
        self.carts.write().await.remove(&session);

        Ok(())
    }
}
