//! Property-based tests for GST computation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::compute_gst;

/// Amounts from 0.00 to 10,000,000.00.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64).prop_map(|paise| Decimal::new(paise, 2))
}

/// Rates from 0.00 to 100.00 percent.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|basis| Decimal::new(basis, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Intra-state: the two halves are equal and add up to the total.
    #[test]
    fn prop_intra_state_halves(amount in arb_amount(), rate in arb_rate()) {
        let b = compute_gst(amount, rate, false).unwrap();
        prop_assert_eq!(b.cgst, b.sgst);
        prop_assert_eq!(b.cgst + b.sgst, b.total);
        prop_assert_eq!(b.igst, Decimal::ZERO);
    }

    /// Inter-state: everything is IGST.
    #[test]
    fn prop_inter_state_is_igst(amount in arb_amount(), rate in arb_rate()) {
        let b = compute_gst(amount, rate, true).unwrap();
        prop_assert_eq!(b.cgst, Decimal::ZERO);
        prop_assert_eq!(b.sgst, Decimal::ZERO);
        prop_assert_eq!(b.igst, b.total);
    }

    /// The total does not depend on where the supply goes.
    #[test]
    fn prop_total_independent_of_destination(amount in arb_amount(), rate in arb_rate()) {
        let intra = compute_gst(amount, rate, false).unwrap();
        let inter = compute_gst(amount, rate, true).unwrap();
        prop_assert_eq!(intra.total, inter.total);
        prop_assert_eq!(intra.total, amount * rate / Decimal::ONE_HUNDRED);
    }

    /// Zero rate yields no tax.
    #[test]
    fn prop_zero_rate_is_exempt(amount in arb_amount(), inter in any::<bool>()) {
        let b = compute_gst(amount, Decimal::ZERO, inter).unwrap();
        prop_assert!(b.is_exempt());
    }

    /// Breakdowns add component-wise across lines.
    #[test]
    fn prop_additive(a in arb_amount(), b in arb_amount(), rate in arb_rate()) {
        let sum = compute_gst(a, rate, false).unwrap() + compute_gst(b, rate, false).unwrap();
        let whole = compute_gst(a + b, rate, false).unwrap();
        prop_assert_eq!(sum.total, whole.total);
        prop_assert_eq!(sum.cgst, whole.cgst);
    }
}
