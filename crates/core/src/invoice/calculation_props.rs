//! Property tests for line amounts and invoice totals.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::item::{ItemSpec, MAX_AMOUNT, compute_amount, round_money};
use super::totals::{GST_RATE, InvoiceTotals};

/// Quantity in thousandths, 0.001 to 10,000.000.
fn quantity() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|milli| Decimal::new(milli, 3))
}

/// Rate in cents, 0.01 to 100,000.00.
fn rate() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Discount in hundredths of a percent, 0.00 to 100.00.
fn discount() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000).prop_map(|basis| Decimal::new(basis, 2))
}

/// Any representable decimal, sign and scale included.
fn any_decimal() -> impl Strategy<Value = Decimal> {
    (any::<u32>(), any::<u32>(), any::<u32>(), any::<bool>(), 0u32..=28)
        .prop_map(|(lo, mid, hi, negative, scale)| Decimal::from_parts(lo, mid, hi, negative, scale))
}

fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// amount == round(q * r * (1 - d/100), 2)
    #[test]
    fn prop_amount_formula(q in quantity(), r in rate(), d in discount()) {
        let expected = round_money(q * r * (Decimal::ONE - d / dec!(100)));
        prop_assert_eq!(compute_amount(Some(q), Some(r), Some(d)).unwrap(), expected);
    }

    /// A line amount is never negative and never above the undiscounted price.
    #[test]
    fn prop_amount_bounded(q in quantity(), r in rate(), d in discount()) {
        let amount = compute_amount(Some(q), Some(r), Some(d)).unwrap();
        prop_assert!(amount >= Decimal::ZERO);
        prop_assert!(amount <= round_money(q * r));
        prop_assert!(amount.scale() <= 2);
    }

    /// A built item stores exactly the formula's amount.
    #[test]
    fn prop_built_item_amount(q in quantity(), r in rate(), d in discount()) {
        let item = ItemSpec {
            product_id: None,
            description: Some("Item".into()),
            quantity: Some(q),
            unit: Some("KG".into()),
            rate: Some(r),
            discount_percent: Some(d),
        }
        .build()
        .unwrap();
        prop_assert_eq!(item.amount, compute_amount(Some(q), Some(r), Some(d)).unwrap());
    }

    /// Whatever arrives on the wire, building either fails with messages or
    /// yields an item whose fields and amount fit their columns.
    #[test]
    fn prop_build_stays_in_range(q in any_decimal(), r in any_decimal(), d in any_decimal()) {
        let built = ItemSpec {
            product_id: None,
            description: Some("Item".into()),
            quantity: Some(q),
            unit: Some("KG".into()),
            rate: Some(r),
            discount_percent: Some(d),
        }
        .build();

        if let Ok(item) = built {
            prop_assert!(item.quantity > Decimal::ZERO && item.quantity.scale() <= 3);
            prop_assert!(item.rate > Decimal::ZERO && item.rate.scale() <= 2);
            prop_assert!(item.discount_percent.scale() <= 2);
            prop_assert!(item.amount >= Decimal::ZERO && item.amount < MAX_AMOUNT);
        }
    }

    /// subtotal is the sum, total is subtotal + gst.
    #[test]
    fn prop_totals_aggregate(amounts in prop::collection::vec(amount(), 0..30)) {
        let totals = InvoiceTotals::from_amounts(amounts.iter().copied()).unwrap();
        let sum: Decimal = amounts.iter().copied().sum();

        prop_assert_eq!(totals.subtotal, sum);
        prop_assert_eq!(totals.gst_amount, round_money(sum * GST_RATE));
        prop_assert_eq!(totals.total_amount, totals.subtotal + totals.gst_amount);
    }

    /// Totals do not depend on item order.
    #[test]
    fn prop_totals_order_independent(mut amounts in prop::collection::vec(amount(), 0..30)) {
        let forward = InvoiceTotals::from_amounts(amounts.iter().copied()).unwrap();
        amounts.reverse();
        prop_assert_eq!(forward, InvoiceTotals::from_amounts(amounts).unwrap());
    }
}
