//! Order pricing
//!
//! Pure totals calculation over frozen line items. All arithmetic is
//! `Decimal`; tax is rounded half-up to 2 decimal places to match
//! currency display. No I/O, no error paths: quantity validation is
//! the inventory ledger's job before prices reach this module.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Orders strictly above this subtotal ship free
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(5000, 0, 0, false, 0);

/// Flat shipping fee below the free-shipping threshold
pub const FLAT_SHIPPING_FEE: Decimal = Decimal::from_parts(150, 0, 0, false, 0);

/// Tax rate applied to the subtotal (5%)
pub const TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Computed order totals: `total = subtotal + shipping_fee + tax`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Price a set of (unit price, quantity) pairs.
///
/// Deterministic and side-effect free; computed once at order
/// creation and never recomputed after line items are frozen.
pub fn price_items(items: &[(Decimal, u32)]) -> OrderTotals {
    let subtotal: Decimal = items
        .iter()
        .map(|(price, qty)| price * Decimal::from(*qty))
        .sum();

    let shipping_fee = if subtotal > FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        FLAT_SHIPPING_FEE
    };

    let tax = (subtotal * TAX_RATE)
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);

    OrderTotals {
        subtotal,
        shipping_fee,
        tax,
        total: subtotal + shipping_fee + tax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_cart() {
        let t = price_items(&[]);
        assert_eq!(t.subtotal, Decimal::ZERO);
        assert_eq!(t.shipping_fee, FLAT_SHIPPING_FEE);
        assert_eq!(t.tax, Decimal::ZERO);
        assert_eq!(t.total, FLAT_SHIPPING_FEE);
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let t = price_items(&[(dec("12.50"), 3), (dec("100"), 2)]);
        assert_eq!(t.subtotal, dec("237.50"));
    }

    #[test]
    fn test_shipping_fee_threshold_is_strict() {
        // Exactly at the threshold still pays shipping
        let t = price_items(&[(dec("5000"), 1)]);
        assert_eq!(t.shipping_fee, dec("150"));

        let t = price_items(&[(dec("5000.01"), 1)]);
        assert_eq!(t.shipping_fee, Decimal::ZERO);
    }

    #[test]
    fn test_spec_scenario_subtotal_6000() {
        // subtotal 6000 -> free shipping, tax 300.00, total 6300.00
        let t = price_items(&[(dec("6000"), 1)]);
        assert_eq!(t.shipping_fee, Decimal::ZERO);
        assert_eq!(t.tax, dec("300.00"));
        assert_eq!(t.total, dec("6300.00"));
    }

    #[test]
    fn test_tax_rounds_half_up() {
        // 10.10 * 0.05 = 0.505 -> rounds to 0.51
        let t = price_items(&[(dec("10.10"), 1)]);
        assert_eq!(t.tax, dec("0.51"));

        // 10.05 * 0.05 = 0.5025 -> 0.50
        let t = price_items(&[(dec("10.05"), 1)]);
        assert_eq!(t.tax, dec("0.50"));
    }

    #[test]
    fn test_total_identity_holds() {
        for items in [
            vec![(dec("19.99"), 2), (dec("4.25"), 5)],
            vec![(dec("5999.99"), 1)],
            vec![(dec("0.01"), 1)],
        ] {
            let t = price_items(&items);
            assert_eq!(t.total, t.subtotal + t.shipping_fee + t.tax);
        }
    }

    #[test]
    fn test_deterministic() {
        let items = [(dec("7.77"), 3), (dec("1234.56"), 2)];
        assert_eq!(price_items(&items), price_items(&items));
    }
}
