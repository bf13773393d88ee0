//! Printworks
//!
//! Printworks prices a custom-print storefront: bulk quantity tiers, option surcharges, coupons,
//! payment-method discounts and shipping, through to placed orders and receipts.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod coupons;
pub mod discounts;
pub mod fixtures;
pub mod items;
pub mod observability;
pub mod orders;
pub mod payments;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod services;
pub mod shipping;
pub mod tiers;
