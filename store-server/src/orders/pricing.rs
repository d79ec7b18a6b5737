//! Pricing engine
//!
//! Pure function from a normalized item list to order amounts. All arithmetic
//! is integer cents; the only fractional step (the tax rate multiplication)
//! goes through `Decimal` and rounds half-up to whole cents.

use rust_decimal::prelude::*;

use crate::orders::model::LineItem;

/// Fixed tax rate (8%)
const TAX_RATE_PERCENT: i64 = 8;

/// Flat shipping charge in cents (reserved, currently free)
const SHIPPING_CHARGE_CENTS: i64 = 0;

/// Derived order amounts, in cents.
///
/// Invariant: `final_amount == subtotal + tax_amount + shipping_charge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amounts {
    pub subtotal: i64,
    pub tax_amount: i64,
    pub shipping_charge: i64,
    pub final_amount: i64,
}

/// Price a normalized item list.
///
/// Deterministic and free of side effects: identical input yields identical
/// output regardless of call order or prior state. Inputs are bounded by the
/// normalization caps, so the cent sums stay far away from `i64` overflow.
pub fn price(items: &[LineItem]) -> Amounts {
    let subtotal: i64 = items
        .iter()
        .map(|item| item.unit_price * item.quantity)
        .sum();

    let tax_amount = tax_for(subtotal);
    let shipping_charge = SHIPPING_CHARGE_CENTS;

    Amounts {
        subtotal,
        tax_amount,
        shipping_charge,
        final_amount: subtotal + tax_amount + shipping_charge,
    }
}

/// Tax on a cent subtotal, rounded half-up to whole cents
fn tax_for(subtotal_cents: i64) -> i64 {
    let tax = Decimal::from(subtotal_cents) * Decimal::from(TAX_RATE_PERCENT)
        / Decimal::ONE_HUNDRED;
    tax.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        // SAFETY: bounded by normalization caps, always within i64
        .expect("tax amount fits in i64 cents")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(unit_price: i64, quantity: i64) -> LineItem {
        LineItem {
            product_id: String::new(),
            name: String::new(),
            unit_price,
            quantity,
            description: None,
            image: None,
        }
    }

    #[test]
    fn test_reference_example() {
        // 2 x 100.00 + 1 x 50.00 => 250.00 subtotal, 20.00 tax, 270.00 total
        let amounts = price(&[item(10_000, 2), item(5_000, 1)]);
        assert_eq!(amounts.subtotal, 25_000);
        assert_eq!(amounts.tax_amount, 2_000);
        assert_eq!(amounts.shipping_charge, 0);
        assert_eq!(amounts.final_amount, 27_000);
    }

    #[test]
    fn test_order_independent() {
        let a = price(&[item(10_000, 2), item(5_000, 1), item(333, 7)]);
        let b = price(&[item(333, 7), item(10_000, 2), item(5_000, 1)]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_and_zero_priced() {
        let amounts = price(&[]);
        assert_eq!(amounts.subtotal, 0);
        assert_eq!(amounts.tax_amount, 0);
        assert_eq!(amounts.final_amount, 0);

        let amounts = price(&[item(0, 5)]);
        assert_eq!(amounts.final_amount, 0);
    }

    #[test]
    fn test_tax_rounding() {
        // 0.31 subtotal => 0.0248 tax, rounds to 0.02
        assert_eq!(price(&[item(31, 1)]).tax_amount, 2);
        // 1.06 subtotal => 0.0848 tax, rounds to 0.08
        assert_eq!(price(&[item(106, 1)]).tax_amount, 8);
        // 1.07 subtotal => 0.0856 tax, rounds to 0.09
        assert_eq!(price(&[item(107, 1)]).tax_amount, 9);
    }

    #[test]
    fn test_invariant_holds_under_random_input() {
        use rand::Rng;
        let mut rng = rand::thread_rng();

        for _ in 0..200 {
            let count = rng.gen_range(1..=8);
            let items: Vec<LineItem> = (0..count)
                .map(|_| item(rng.gen_range(0..=1_000_000), rng.gen_range(1..=99)))
                .collect();

            let amounts = price(&items);
            assert_eq!(
                amounts.final_amount,
                amounts.subtotal + amounts.tax_amount + amounts.shipping_charge
            );
            // Re-pricing the same input is identical
            assert_eq!(price(&items), amounts);
        }
    }
}
