//! Orders
//!
//! Orders move `Pending → Confirmed → Processing → Shipped → Delivered`. They can be cancelled
//! or refunded only while still `Pending` or `Confirmed`.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::{
    checkout::OrderTotal, coupons::CouponCode, items::LineItem, payments::PaymentMethod,
};

/// Errors changing an order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// The status change is not allowed (from, to).
    #[error("cannot move order from {0} to {1}")]
    InvalidTransition(OrderStatus, OrderStatus),
}

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Placed, awaiting confirmation.
    Pending,

    /// Confirmed by the shop.
    Confirmed,

    /// Being printed.
    Processing,

    /// Handed to the courier.
    Shipped,

    /// Received by the customer.
    Delivered,

    /// Cancelled before processing.
    Cancelled,

    /// Refunded before processing.
    Refunded,
}

impl OrderStatus {
    /// Whether `next` may follow this status.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::{
            Cancelled, Confirmed, Delivered, Pending, Processing, Refunded, Shipped,
        };

        matches!(
            (self, next),
            (Pending, Confirmed | Cancelled | Refunded)
                | (Confirmed, Processing | Cancelled | Refunded)
                | (Processing, Shipped)
                | (Shipped, Delivered)
        )
    }

    /// Whether no further changes are possible.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }

    /// Stable identifier, as stored.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies an order. Chosen by the client before submission so retries are idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Generate a new random order id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing id.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Underlying UUID.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An order to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// Client-chosen id
    pub id: OrderId,

    /// Lines copied from the cart
    pub lines: Vec<LineItem<'static>>,

    /// Price breakdown
    pub totals: OrderTotal<'static>,

    /// Coupon used, if any
    pub coupon: Option<CouponCode>,

    /// Payment method
    pub payment_method: PaymentMethod,
}

/// A placed order. Lines and totals are fixed once placed.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    status: OrderStatus,
    lines: Vec<LineItem<'static>>,
    totals: OrderTotal<'static>,
    coupon: Option<CouponCode>,
    payment_method: PaymentMethod,
}

impl Order {
    /// A pending order from a submission.
    pub fn place(new: NewOrder) -> Self {
        Self {
            id: new.id,
            status: OrderStatus::Pending,
            lines: new.lines,
            totals: new.totals,
            coupon: new.coupon,
            payment_method: new.payment_method,
        }
    }

    /// Order id.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Ordered lines.
    pub fn lines(&self) -> &[LineItem<'static>] {
        &self.lines
    }

    /// Price breakdown at placement.
    pub fn totals(&self) -> &OrderTotal<'static> {
        &self.totals
    }

    /// Coupon used, if any.
    pub fn coupon(&self) -> Option<&CouponCode> {
        self.coupon.as_ref()
    }

    /// Payment method.
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Move to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] if `next` cannot follow the current status.
    pub fn transition(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition(self.status, next));
        }

        self.status = next;

        Ok(())
    }

    /// Cancel the order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] once processing has started.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Cancelled)
    }

    /// Refund the order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] once processing has started.
    pub fn refund(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Refunded)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::INR};
    use testresult::TestResult;

    use crate::products::ProductKey;

    use super::*;

    const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ];

    fn order() -> Order {
        let amount = Money::from_minor(299_00, INR);
        let zero = Money::from_minor(0, INR);

        Order::place(NewOrder {
            id: OrderId::new(),
            lines: vec![LineItem::new(ProductKey::default(), 1, amount)],
            totals: OrderTotal {
                subtotal: amount,
                coupon_discount: zero,
                payment_method_discount: zero,
                shipping_cost: zero,
                final_total: amount,
            },
            coupon: None,
            payment_method: PaymentMethod::CashOnDelivery,
        })
    }

    #[test]
    fn placed_orders_are_pending() {
        assert_eq!(order().status(), OrderStatus::Pending);
    }

    #[test]
    fn happy_path_to_delivery() -> TestResult {
        let mut order = order();

        for next in [
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            order.transition(next)?;
        }

        assert_eq!(order.status(), OrderStatus::Delivered);
        assert!(order.status().is_terminal());

        Ok(())
    }

    #[test]
    fn cancel_allowed_while_pending_or_confirmed() -> TestResult {
        let mut pending = order();
        pending.cancel()?;

        let mut confirmed = order();
        confirmed.transition(OrderStatus::Confirmed)?;
        confirmed.refund()?;

        assert_eq!(pending.status(), OrderStatus::Cancelled);
        assert_eq!(confirmed.status(), OrderStatus::Refunded);

        Ok(())
    }

    #[test]
    fn cancel_rejected_once_processing() -> TestResult {
        let mut order = order();
        order.transition(OrderStatus::Confirmed)?;
        order.transition(OrderStatus::Processing)?;

        assert_eq!(
            order.cancel(),
            Err(OrderError::InvalidTransition(
                OrderStatus::Processing,
                OrderStatus::Cancelled
            ))
        );
        assert_eq!(order.status(), OrderStatus::Processing);

        Ok(())
    }

    #[test]
    fn terminal_states_have_no_transitions() {
        for from in ALL.into_iter().filter(|status| status.is_terminal()) {
            for to in ALL {
                assert!(
                    !from.can_transition_to(to),
                    "{from} should not move to {to}"
                );
            }
        }
    }

    #[test]
    fn skipping_steps_is_rejected() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Processing));
    }
}
