//! Receipt
//!
//! Plain-text order summaries: one table row per line, followed by the totals breakdown.

use std::io;

use rusty_money::{Money, MoneyError, iso::Currency};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{Alignment, Style, Theme, object::Columns},
};
use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError},
    checkout::OrderTotal,
    items::LineItem,
    pricing::{LineTotalError, Precision},
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// A line's product is missing from the catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A line total could not be computed.
    #[error(transparent)]
    LineTotal(#[from] LineTotalError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Receipt for a priced cart or placed order.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'r, 'a> {
    lines: &'r [LineItem<'a>],
    totals: &'r OrderTotal<'a>,
    precision: Precision,
}

impl<'r, 'a> Receipt<'r, 'a> {
    /// Create a receipt for `lines` priced as `totals`.
    pub fn new(lines: &'r [LineItem<'a>], totals: &'r OrderTotal<'a>, precision: Precision) -> Self {
        Self {
            lines,
            totals,
            precision,
        }
    }

    /// Write the receipt, looking product names up in `catalog`.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a product is missing, a line total fails or writing fails.
    pub fn write_to(&self, mut out: impl io::Write, catalog: &Catalog<'_>) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Options", "Qty", "Unit Price", "Line Total"]);

        for (idx, line) in self.lines.iter().enumerate() {
            let product = catalog.product(line.product())?;

            builder.push_record([
                format!("#{}", idx + 1),
                product.name.clone(),
                describe_options(line),
                line.quantity().to_string(),
                line.unit_price().to_string(),
                line.total(self.precision)?.to_string(),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Columns::new(3..6), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let totals = self.totals;
        let mut rows: Vec<(&str, String)> = vec![("Subtotal:", totals.subtotal.to_string())];

        push_deduction(&mut rows, "Coupon:", totals.coupon_discount);
        push_deduction(&mut rows, "Online payment:", totals.payment_method_discount);

        rows.push((
            "Shipping:",
            if totals.shipping_cost.to_minor_units() == 0 {
                "Free".to_string()
            } else {
                totals.shipping_cost.to_string()
            },
        ));

        rows.push(("Total:", totals.final_total.to_string()));

        let savings = totals.savings()?;

        if savings.to_minor_units() > 0 {
            rows.push(("You save:", savings.to_string()));
        }

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = rows
            .iter()
            .map(|(_, value)| value.chars().count())
            .max()
            .unwrap_or(0);

        for (label, value) in &rows {
            writeln!(out, " {label:>label_width$}  {value:>value_width$}")
                .map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

fn push_deduction<'l>(rows: &mut Vec<(&'l str, String)>, label: &'l str, amount: Money<'_, Currency>) {
    if amount.to_minor_units() > 0 {
        rows.push((label, format!("-{amount}")));
    }
}

fn describe_options(line: &LineItem<'_>) -> String {
    line.variant()
        .into_iter()
        .map(ToString::to_string)
        .chain(
            line.options()
                .iter()
                .map(|option| format!("{}: {}", option.group, option.choice)),
        )
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use crate::{
        cart::Cart,
        checkout::{PricingPolicy, compute_order_total},
        discounts::percent_points,
        payments::PaymentMethod,
        products::{OptionGroup, Product, ProductKind, VariantPrices},
    };

    use super::*;

    #[test]
    fn write_to_renders_lines_and_totals() -> TestResult {
        let mut catalog = Catalog::new();

        let photo = catalog.insert(
            "acrylic-photo",
            Product::new(
                "Acrylic Photo",
                ProductKind::AcrylicPhoto(VariantPrices::new([(
                    "8x6".to_string(),
                    Money::from_minor(499_00, INR),
                )])?),
            )
            .with_option(OptionGroup::new(
                "Finish",
                [("Matte".to_string(), Money::from_minor(50_00, INR))],
            )?),
        )?;

        let line = catalog.line_item(photo, 2, Some("8x6"), &[("Finish", "Matte")])?;
        let cart = Cart::with_lines([line], INR)?;

        let policy = PricingPolicy::new(INR).with_online_discount(percent_points(Decimal::from(5)));
        let totals = compute_order_total(&cart, None, PaymentMethod::Online, &policy)?;

        let mut out = Vec::new();

        Receipt::new(cart.lines(), &totals, policy.precision).write_to(&mut out, &catalog)?;

        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Acrylic Photo"), "missing product name");
        assert!(rendered.contains("8x6, Finish: Matte"), "missing options");
        assert!(rendered.contains("Online payment:"), "missing online discount");
        assert!(rendered.contains("Free"), "missing free shipping");
        assert!(rendered.contains("You save:"), "missing savings");

        Ok(())
    }

    #[test]
    fn write_to_fails_for_unknown_product() -> TestResult {
        let catalog = Catalog::new();
        let cart = Cart::with_lines(
            [LineItem::new(
                crate::products::ProductKey::default(),
                1,
                Money::from_minor(100_00, INR),
            )],
            INR,
        )?;
        let policy = PricingPolicy::new(INR);
        let totals = compute_order_total(&cart, None, PaymentMethod::CashOnDelivery, &policy)?;

        let result =
            Receipt::new(cart.lines(), &totals, policy.precision).write_to(Vec::new(), &catalog);

        assert!(matches!(
            result,
            Err(ReceiptError::Catalog(CatalogError::MissingProduct(_)))
        ));

        Ok(())
    }
}
