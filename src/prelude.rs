//! Printworks prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartRepository, InMemoryCartRepository, SessionId},
    catalog::{Catalog, CatalogError},
    checkout::{CheckoutError, OrderTotal, PricingPolicy, compute_order_total},
    coupons::{AppliedCoupon, Coupon, CouponCode, CouponDiscount, CouponError, apply_coupon},
    discounts::{DiscountError, percent_points},
    items::{LineItem, SelectedOption},
    orders::{NewOrder, Order, OrderError, OrderId, OrderStatus},
    payments::{PaymentDiscountBase, PaymentMethod, apply_payment_discount},
    pricing::{LineTotalError, Precision, compute_line_total, total_price},
    products::{OptionGroup, Product, ProductError, ProductKey, ProductKind, VariantPrices},
    receipt::{Receipt, ReceiptError},
    services::{
        CheckoutService, CouponService, InMemoryCouponStore, InMemoryOrderStore, OrderService,
        Redemption, ServiceError,
    },
    shipping::ShippingPolicy,
    tiers::{PricingTier, TierError, TierSchedule, resolve_unit_price},
};
