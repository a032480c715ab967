//! Cart and order totals.
//!
//! `total = subtotal + subtotal * 8% + shipping`, where shipping is a flat
//! 9.99 unless the subtotal is strictly above 50.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// 0.08
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);
/// 50
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
/// 9.99
pub const SHIPPING_FEE: Decimal = Decimal::from_parts(999, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

fn money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

pub fn shipping_for(subtotal: Decimal) -> Decimal {
    if subtotal > FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        SHIPPING_FEE
    }
}

/// Totals for `(unit_price, quantity)` lines.
pub fn compute<I>(lines: I) -> Totals
where
    I: IntoIterator<Item = (Decimal, i32)>,
{
    let subtotal = money(
        lines
            .into_iter()
            .map(|(price, qty)| line_total(price, qty))
            .sum(),
    );
    let tax = money(subtotal * TAX_RATE);
    let shipping = shipping_for(subtotal);
    Totals {
        subtotal,
        tax,
        shipping,
        total: subtotal + tax + shipping,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn small_cart_pays_shipping() {
        let t = compute([(dec("10.00"), 2), (dec("5.50"), 1)]);
        assert_eq!(t.subtotal, dec("25.50"));
        assert_eq!(t.tax, dec("2.04"));
        assert_eq!(t.shipping, dec("9.99"));
        assert_eq!(t.total, dec("37.53"));
    }

    #[test]
    fn exactly_fifty_still_pays_shipping() {
        let t = compute([(dec("25.00"), 2)]);
        assert_eq!(t.subtotal, dec("50.00"));
        assert_eq!(t.shipping, SHIPPING_FEE);
        assert_eq!(t.total, dec("63.99"));
    }

    #[test]
    fn above_fifty_ships_free() {
        let t = compute([(dec("50.01"), 1)]);
        assert_eq!(t.shipping, Decimal::ZERO);
        assert_eq!(t.tax, dec("4.00"));
        assert_eq!(t.total, dec("54.01"));
    }

    #[test]
    fn empty_cart() {
        let t = compute(std::iter::empty());
        assert_eq!(t.subtotal, Decimal::ZERO);
        assert_eq!(t.tax, Decimal::ZERO);
        assert_eq!(t.total, SHIPPING_FEE);
    }

    #[test]
    fn total_formula_holds_over_many_carts() {
        let prices = [dec("0.99"), dec("3.33"), dec("12.49"), dec("19.95"), dec("74.00")];
        for (i, &a) in prices.iter().enumerate() {
            for (j, &b) in prices.iter().enumerate() {
                let t = compute([(a, i as i32 + 1), (b, j as i32)]);
                let subtotal = a * Decimal::from(i as i32 + 1) + b * Decimal::from(j as i32);
                let shipping = if subtotal > dec("50") { dec("0") } else { dec("9.99") };
                let expected = subtotal + money(subtotal * dec("0.08")) + shipping;
                assert_eq!(t.total, expected, "a={a} b={b}");
            }
        }
    }
}
