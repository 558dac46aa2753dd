//! Property-based tests for invoice status transitions.

use chrono::{DateTime, Duration, TimeZone, Utc};
use hisaab_shared::types::InvoiceId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::invoice::transition::InvoiceLifecycle;
use crate::invoice::types::{InvoiceSnapshot, InvoiceStatus, PaymentDetails, PaymentMethod};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

fn arb_status() -> impl Strategy<Value = InvoiceStatus> {
    prop_oneof![
        Just(InvoiceStatus::Draft),
        Just(InvoiceStatus::Sent),
        Just(InvoiceStatus::Paid),
        Just(InvoiceStatus::Overdue),
        Just(InvoiceStatus::Cancelled),
    ]
}

fn arb_method() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![
        Just(PaymentMethod::Cash),
        Just(PaymentMethod::Card),
        Just(PaymentMethod::Upi),
        Just(PaymentMethod::BankTransfer),
        Just(PaymentMethod::Cheque),
        Just(PaymentMethod::Other),
    ]
}

/// Amounts from 0.01 to 1,000,000.00.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|paise| Decimal::new(paise, 2))
}

/// An invoice whose due date lies up to a year either side of `base_time`.
fn arb_invoice() -> impl Strategy<Value = InvoiceSnapshot> {
    (arb_status(), arb_amount(), -365i64..365, any::<bool>()).prop_map(
        |(status, total, due_offset, sent)| InvoiceSnapshot {
            id: InvoiceId::new(),
            invoice_number: "INV-202601-0001".to_string(),
            status,
            total_amount: total,
            paid_amount: Decimal::ZERO,
            balance_amount: total,
            due_date: base_time() + Duration::days(due_offset),
            sent_date: sent.then(|| base_time() - Duration::days(400)),
            updated_at: base_time() - Duration::days(400),
        },
    )
}

/// Moments up to a year either side of `base_time`.
fn arb_now() -> impl Strategy<Value = DateTime<Utc>> {
    (-365i64 * 24..365 * 24).prop_map(|hours| base_time() + Duration::hours(hours))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// PAID always settles the invoice in full.
    #[test]
    fn prop_paid_settles_balance(
        inv in arb_invoice(),
        now in arb_now(),
        method in arb_method(),
        with_details in any::<bool>(),
    ) {
        let details = with_details.then_some(PaymentDetails { amount: None, method, reference: None });
        let t = InvoiceLifecycle::transition(&inv, InvoiceStatus::Paid, details, now).unwrap();
        let after = t.invoice_update.apply_to(&inv);

        prop_assert_eq!(after.status, InvoiceStatus::Paid);
        prop_assert_eq!(after.paid_amount, inv.total_amount);
        prop_assert_eq!(after.balance_amount, Decimal::ZERO);
        prop_assert_eq!(t.payment_to_create.is_some(), with_details);
    }

    /// CANCELLED always clears the paid amount.
    #[test]
    fn prop_cancelled_restores_balance(inv in arb_invoice(), now in arb_now()) {
        let t = InvoiceLifecycle::transition(&inv, InvoiceStatus::Cancelled, None, now).unwrap();
        let after = t.invoice_update.apply_to(&inv);

        prop_assert_eq!(after.paid_amount, Decimal::ZERO);
        prop_assert_eq!(after.balance_amount, inv.total_amount);
    }

    /// OVERDUE applies exactly when the due date has passed.
    #[test]
    fn prop_overdue_only_after_due_date(inv in arb_invoice(), now in arb_now()) {
        let t = InvoiceLifecycle::transition(&inv, InvoiceStatus::Overdue, None, now).unwrap();
        let after = t.invoice_update.apply_to(&inv);

        if now > inv.due_date {
            prop_assert!(t.status_changed());
            prop_assert_eq!(after.status, InvoiceStatus::Overdue);
        } else {
            prop_assert!(!t.status_changed());
            prop_assert_eq!(after.status, inv.status);
        }
    }

    /// `sent_date` is only stamped when leaving DRAFT.
    #[test]
    fn prop_sent_date_only_from_draft(inv in arb_invoice(), now in arb_now()) {
        let t = InvoiceLifecycle::transition(&inv, InvoiceStatus::Sent, None, now).unwrap();
        if inv.status == InvoiceStatus::Draft {
            prop_assert_eq!(t.invoice_update.sent_date, Some(now));
        } else {
            prop_assert_eq!(t.invoice_update.sent_date, None);
        }
    }

    /// Every transition stamps `updated_at`, and only PAID creates payments.
    #[test]
    fn prop_every_transition_touches(
        inv in arb_invoice(),
        requested in arb_status(),
        now in arb_now(),
        amount in arb_amount(),
        method in arb_method(),
    ) {
        let details = PaymentDetails { amount: Some(amount), method, reference: None };
        let t = InvoiceLifecycle::transition(&inv, requested, Some(details), now).unwrap();

        prop_assert_eq!(t.invoice_update.updated_at, now);
        prop_assert_eq!(t.payment_to_create.is_some(), requested == InvoiceStatus::Paid);
    }

    /// Outside CANCELLED, the balance stays equal to total minus paid.
    #[test]
    fn prop_balance_invariant(
        inv in arb_invoice(),
        requested in arb_status(),
        now in arb_now(),
    ) {
        let t = InvoiceLifecycle::transition(&inv, requested, None, now).unwrap();
        let after = t.invoice_update.apply_to(&inv);
        if after.status != InvoiceStatus::Cancelled {
            prop_assert_eq!(after.balance_amount, after.total_amount - after.paid_amount);
        }
    }
}
