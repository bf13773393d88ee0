//! Printworks checkout
//!
//! Loads a fixture set, places its cart as an order and prints the receipt.

use std::{io, process};

use clap::Parser;
use thiserror::Error;
use tracing::{error, info};

use printworks::{
    checkout::CheckoutError,
    config::{AppConfig, ConfigError},
    coupons::{CouponCode, CouponError},
    fixtures::{Fixture, FixtureError},
    observability::{ObservabilityError, init_subscriber},
    orders::OrderId,
    receipt::{Receipt, ReceiptError},
    services::{CheckoutService, InMemoryCouponStore, InMemoryOrderStore},
};

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Observability(#[from] ObservabilityError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Receipt(#[from] ReceiptError),
}

impl AppError {
    fn user_message(&self) -> Option<String> {
        match self {
            AppError::Checkout(error) => error.user_message(),
            AppError::Coupon(error) => Some(error.to_string()),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() {
    let config = AppConfig::parse();

    if let Err(error) = init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for setup errors"
        )]
        {
            eprintln!("Logging setup error: {error}");
        }

        process::exit(1);
    }

    if let Err(error) = run(&config).await {
        error!(%error, "checkout failed");

        if let Some(message) = error.user_message() {
            #[expect(clippy::print_stderr, reason = "shopper-facing message")]
            {
                eprintln!("{message}");
            }
        }

        process::exit(1);
    }
}

async fn run(config: &AppConfig) -> Result<(), AppError> {
    let policy = config.pricing.policy()?;

    let mut fixture = Fixture::with_base_path(config.fixtures_dir.clone());
    fixture.load_set(&config.set)?;

    info!(
        set = %config.set,
        products = fixture.catalog().len(),
        coupons = fixture.coupons().len(),
        "loaded fixtures"
    );

    let coupon = config
        .coupon
        .as_deref()
        .map(CouponCode::parse)
        .transpose()?;

    let cart = fixture.cart()?;
    let service = CheckoutService::new(
        InMemoryCouponStore::new(fixture.coupons().iter().cloned()),
        InMemoryOrderStore::new(),
        policy,
    );

    let order = service
        .place_order(cart, coupon.as_ref(), config.payment, OrderId::new())
        .await?;

    info!(order_id = %order.id(), status = %order.status(), "order placed");

    Receipt::new(order.lines(), order.totals(), policy.precision)
        .write_to(io::stdout().lock(), fixture.catalog())?;

    Ok(())
}
