//! Services
//!
//! Backends the storefront talks to (coupons and orders), and the checkout service that prices
//! a cart against them and places the order.

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{Span, debug, info};

use crate::{
    cart::Cart,
    checkout::{CheckoutError, OrderTotal, PricingPolicy, compute_order_total},
    coupons::{Coupon, CouponCode},
    orders::{NewOrder, Order, OrderId},
    payments::PaymentMethod,
};

/// Errors from backend services.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The backend could not be reached.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The requested record does not exist.
    #[error("not found")]
    NotFound,

    /// The backend refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Outcome of recording a coupon redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redemption {
    /// Usage was counted for this order.
    Recorded,

    /// Usage had already been counted for this order.
    AlreadyRecorded,
}

/// Coupon storage.
#[automock]
#[async_trait]
pub trait CouponService: Send + Sync {
    /// Look up a coupon by code.
    async fn find_coupon(&self, code: &CouponCode)
    -> Result<Option<Coupon<'static>>, ServiceError>;

    /// Count one use of a coupon for an order. Repeated calls for the same order count once.
    async fn record_redemption(
        &self,
        code: &CouponCode,
        order: OrderId,
    ) -> Result<Redemption, ServiceError>;
}

/// Order storage.
#[automock]
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Look up an order by id.
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, ServiceError>;

    /// Create an order.
    async fn create_order(&self, order: NewOrder) -> Result<Order, ServiceError>;
}

#[derive(Debug, Default)]
struct CouponLedger {
    coupons: FxHashMap<CouponCode, Coupon<'static>>,
    redemptions: FxHashSet<(CouponCode, OrderId)>,
}

/// Process-local coupon storage.
#[derive(Debug, Default)]
pub struct InMemoryCouponStore {
    ledger: Mutex<CouponLedger>,
}

impl InMemoryCouponStore {
    /// Create a store holding `coupons`.
    pub fn new(coupons: impl IntoIterator<Item = Coupon<'static>>) -> Self {
        let coupons = coupons
            .into_iter()
            .map(|coupon| (coupon.code().clone(), coupon))
            .collect();

        Self {
            ledger: Mutex::new(CouponLedger {
                coupons,
                redemptions: FxHashSet::default(),
            }),
        }
    }
}

#[async_trait]
impl CouponService for InMemoryCouponStore {
    async fn find_coupon(
        &self,
        code: &CouponCode,
    ) -> Result<Option<Coupon<'static>>, ServiceError> {
        Ok(self.ledger.lock().await.coupons.get(code).cloned())
    }

    async fn record_redemption(
        &self,
        code: &CouponCode,
        order: OrderId,
    ) -> Result<Redemption, ServiceError> {
        let mut guard = self.ledger.lock().await;
        let ledger = &mut *guard;

        let Some(coupon) = ledger.coupons.get_mut(code) else {
            return Err(ServiceError::NotFound);
        };

        if !ledger.redemptions.insert((code.clone(), order)) {
            return Ok(Redemption::AlreadyRecorded);
        }

        coupon.record_use();

        Ok(Redemption::Recorded)
    }
}

/// Process-local order storage.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<FxHashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderService for InMemoryOrderStore {
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, ServiceError> {
        Ok(self.orders.lock().await.get(&id).cloned())
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, ServiceError> {
        let mut orders = self.orders.lock().await;

        if orders.contains_key(&order.id) {
            return Err(ServiceError::Rejected(format!(
                "order {} already exists",
                order.id
            )));
        }

        let placed = Order::place(order);
        orders.insert(placed.id(), placed.clone());

        Ok(placed)
    }
}

/// Prices carts and places orders.
#[derive(Debug)]
pub struct CheckoutService<C, O> {
    coupons: C,
    orders: O,
    policy: PricingPolicy<'static>,
}

impl<C: CouponService, O: OrderService> CheckoutService<C, O> {
    /// Create a checkout service.
    pub fn new(coupons: C, orders: O, policy: PricingPolicy<'static>) -> Self {
        Self {
            coupons,
            orders,
            policy,
        }
    }

    /// Store-wide pricing settings.
    pub fn policy(&self) -> &PricingPolicy<'static> {
        &self.policy
    }

    /// Coupon backend.
    pub fn coupons(&self) -> &C {
        &self.coupons
    }

    /// Price a cart without placing an order. Coupon usage is not counted.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the coupon is unknown or cannot be applied, the cart
    /// cannot be totalled or the coupon backend fails.
    #[tracing::instrument(
        name = "checkout.service.quote",
        skip(self, cart, coupon),
        fields(
            payment_method = %method,
            lines = cart.len(),
            final_total = tracing::field::Empty
        ),
        err
    )]
    pub async fn quote(
        &self,
        cart: &Cart<'static>,
        coupon: Option<&CouponCode>,
        method: PaymentMethod,
    ) -> Result<OrderTotal<'static>, CheckoutError> {
        let coupon = self.resolve_coupon(coupon).await?;
        let totals = compute_order_total(cart, coupon.as_ref(), method, &self.policy)?;

        Span::current().record("final_total", tracing::field::display(totals.final_total));

        Ok(totals)
    }

    /// Place an order for a cart.
    ///
    /// `order_id` is chosen by the caller so a retried submission finds the order it already
    /// placed rather than creating a second one. The coupon's usage is recorded once the order
    /// exists, exactly once per order.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the cart is empty, the coupon is unknown or cannot be
    /// applied, or a backend fails.
    #[tracing::instrument(
        name = "checkout.service.place_order",
        skip(self, cart, coupon),
        fields(
            order_id = %order_id,
            payment_method = %method,
            coupon = tracing::field::Empty,
            final_total = tracing::field::Empty
        ),
        err
    )]
    pub async fn place_order(
        &self,
        cart: &Cart<'static>,
        coupon: Option<&CouponCode>,
        method: PaymentMethod,
        order_id: OrderId,
    ) -> Result<Order, CheckoutError> {
        let span = Span::current();

        if let Some(code) = coupon {
            span.record("coupon", tracing::field::display(code));
        }

        let order = if let Some(existing) = self.orders.find_order(order_id).await? {
            debug!("order already placed, resuming");

            existing
        } else {
            if cart.is_empty() {
                return Err(CheckoutError::EmptyCart);
            }

            let resolved = self.resolve_coupon(coupon).await?;
            let totals = compute_order_total(cart, resolved.as_ref(), method, &self.policy)?;

            self.orders
                .create_order(NewOrder {
                    id: order_id,
                    lines: cart.lines().to_vec(),
                    totals,
                    coupon: resolved.as_ref().map(|coupon| coupon.code().clone()),
                    payment_method: method,
                })
                .await?
        };

        span.record(
            "final_total",
            tracing::field::display(order.totals().final_total),
        );

        if let Some(code) = order.coupon() {
            let redemption = self.coupons.record_redemption(code, order.id()).await?;

            debug!(coupon = %code, ?redemption, "recorded coupon redemption");
        }

        info!(order_id = %order.id(), "placed order");

        Ok(order)
    }

    async fn resolve_coupon(
        &self,
        code: Option<&CouponCode>,
    ) -> Result<Option<Coupon<'static>>, CheckoutError> {
        let Some(code) = code else {
            return Ok(None);
        };

        self.coupons
            .find_coupon(code)
            .await?
            .map(Some)
            .ok_or_else(|| CheckoutError::CouponNotFound(code.clone()))
    }
}
