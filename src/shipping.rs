//! Shipping

use rusty_money::{Money, iso::Currency};

/// Flat-rate shipping with an optional free-shipping threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShippingPolicy<'a> {
    /// Fee charged per order
    pub flat_fee: Money<'a, Currency>,

    /// Orders whose discounted merchandise amount reaches this ship free
    pub free_above: Option<Money<'a, Currency>>,
}

impl<'a> ShippingPolicy<'a> {
    /// Free shipping on every order.
    pub fn free(currency: &'a Currency) -> Self {
        Self {
            flat_fee: Money::from_minor(0, currency),
            free_above: None,
        }
    }

    /// Shipping cost for an order whose merchandise comes to `amount` after discounts.
    ///
    /// Empty orders ship nothing and cost nothing.
    pub fn shipping_cost(&self, amount: Money<'a, Currency>, is_empty: bool) -> Money<'a, Currency> {
        let free = is_empty
            || self
                .free_above
                .is_some_and(|threshold| amount.to_minor_units() >= threshold.to_minor_units());

        if free {
            Money::from_minor(0, amount.currency())
        } else {
            self.flat_fee
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;

    use super::*;

    fn policy<'a>() -> ShippingPolicy<'a> {
        ShippingPolicy {
            flat_fee: Money::from_minor(79_00, INR),
            free_above: Some(Money::from_minor(999_00, INR)),
        }
    }

    #[test]
    fn charges_flat_fee_below_threshold() {
        assert_eq!(
            policy().shipping_cost(Money::from_minor(998_00, INR), false),
            Money::from_minor(79_00, INR)
        );
    }

    #[test]
    fn free_at_threshold() {
        assert_eq!(
            policy().shipping_cost(Money::from_minor(999_00, INR), false),
            Money::from_minor(0, INR)
        );
    }

    #[test]
    fn empty_orders_ship_free() {
        assert_eq!(
            policy().shipping_cost(Money::from_minor(0, INR), true),
            Money::from_minor(0, INR)
        );
    }

    #[test]
    fn free_policy_never_charges() {
        assert_eq!(
            ShippingPolicy::free(INR).shipping_cost(Money::from_minor(10_00, INR), false),
            Money::from_minor(0, INR)
        );
    }
}
