//! Property-based tests for billing totals.

use hisaab_shared::types::ItemId;
use proptest::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

use super::service::BillingService;
use super::types::LineInput;

fn arb_line() -> impl Strategy<Value = LineInput> {
    (
        1i64..100_000,      // quantity in thousandths
        0i64..10_000_000,   // unit price in paise
        0i64..=100,         // discount as percent of gross
        prop_oneof![Just(0i64), Just(500), Just(1200), Just(1800), Just(2800)],
    )
        .prop_map(|(qty, price, discount_pct, rate)| {
            let quantity = Decimal::new(qty, 3);
            let unit_price = Decimal::new(price, 2);
            let gross = (quantity * unit_price).round_dp(2);
            LineInput {
                item_id: ItemId::new(),
                quantity,
                unit_price,
                discount: (gross * Decimal::from(discount_pct) / Decimal::ONE_HUNDRED)
                    .round_dp_with_strategy(2, RoundingStrategy::ToZero),
                tax_rate: Decimal::new(rate, 2),
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Aggregates equal the sum of the stored lines.
    #[test]
    fn prop_totals_equal_line_sums(lines in prop::collection::vec(arb_line(), 1..20)) {
        let (resolved, totals) = BillingService::resolve_lines(&lines).unwrap();

        let line_total: Decimal = resolved.iter().map(|l| l.line_total).sum();
        let tax: Decimal = resolved.iter().map(|l| l.tax_amount).sum();
        prop_assert_eq!(totals.total_amount, line_total);
        prop_assert_eq!(totals.tax_amount, tax);
        prop_assert_eq!(
            totals.total_amount,
            totals.subtotal - totals.discount_amount + totals.tax_amount
        );
    }

    /// Every stored amount fits the paise scale.
    #[test]
    fn prop_lines_are_paise(line in arb_line()) {
        let resolved = BillingService::resolve_line(1, &line).unwrap();
        for amount in [resolved.gross, resolved.taxable, resolved.tax_amount, resolved.line_total] {
            prop_assert_eq!(amount, amount.round_dp(2));
            prop_assert!(amount >= Decimal::ZERO);
        }
    }
}
