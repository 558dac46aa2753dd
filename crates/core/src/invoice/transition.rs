//! Invoice status transitions.
//!
//! Every status can be requested from every other status. What changes is
//! decided by the requested status:
//!
//! - `SENT` stamps `sent_date`, but only when leaving `DRAFT`
//! - `PAID` settles the balance and, given payment details, records a payment
//! - `OVERDUE` only applies once the due date has passed
//! - `CANCELLED` clears the paid amount and restores the balance
//! - `DRAFT` has no side effects
//!
//! The clock is passed in so transitions are deterministic under test.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::invoice::error::InvoiceError;
use crate::invoice::types::{
    InvoiceSnapshot, InvoiceStatus, InvoiceUpdate, PaymentDetails, PaymentDraft, PaymentStatus,
    StatusTransition,
};
use crate::numbering;

/// Stateless service for invoice lifecycle rules.
pub struct InvoiceLifecycle;

impl InvoiceLifecycle {
    /// Computes the invoice update and optional payment for a status request.
    ///
    /// `payment` is only consulted for `PAID`.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::InvalidPayment` when a supplied payment amount
    /// is zero or negative.
    pub fn transition(
        current: &InvoiceSnapshot,
        requested: InvoiceStatus,
        payment: Option<PaymentDetails>,
        now: DateTime<Utc>,
    ) -> Result<StatusTransition, InvoiceError> {
        let mut update = InvoiceUpdate::touch(now);
        let mut payment_to_create = None;

        match requested {
            InvoiceStatus::Sent => {
                update.status = Some(InvoiceStatus::Sent);
                if current.status == InvoiceStatus::Draft {
                    update.sent_date = Some(now);
                }
            }
            InvoiceStatus::Paid => {
                update.status = Some(InvoiceStatus::Paid);
                update.paid_amount = Some(current.total_amount);
                update.balance_amount = Some(Decimal::ZERO);
                if let Some(details) = payment {
                    payment_to_create = Some(Self::payment_draft(current, details, now)?);
                }
            }
            InvoiceStatus::Overdue => {
                if Self::is_past_due(current.due_date, now) {
                    update.status = Some(InvoiceStatus::Overdue);
                }
            }
            InvoiceStatus::Cancelled => {
                update.status = Some(InvoiceStatus::Cancelled);
                update.paid_amount = Some(Decimal::ZERO);
                update.balance_amount = Some(current.total_amount);
            }
            InvoiceStatus::Draft => {
                update.status = Some(InvoiceStatus::Draft);
            }
        }

        Ok(StatusTransition {
            requested,
            invoice_update: update,
            payment_to_create,
        })
    }

    /// Returns true once `now` is strictly after `due_date`.
    #[must_use]
    pub fn is_past_due(due_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now > due_date
    }

    /// Due date for an invoice issued at `issue_date` on `payment_terms_days` terms.
    #[must_use]
    pub fn due_date(issue_date: DateTime<Utc>, payment_terms_days: u32) -> DateTime<Utc> {
        issue_date + Duration::days(i64::from(payment_terms_days))
    }

    fn payment_draft(
        invoice: &InvoiceSnapshot,
        details: PaymentDetails,
        now: DateTime<Utc>,
    ) -> Result<PaymentDraft, InvoiceError> {
        let amount = match details.amount {
            Some(amount) if amount <= Decimal::ZERO => {
                return Err(InvoiceError::InvalidPayment(amount));
            }
            Some(amount) => amount,
            None => invoice.total_amount,
        };

        Ok(PaymentDraft {
            payment_number: numbering::payment_number(now),
            invoice_id: invoice.id,
            amount,
            method: details.method,
            reference: details.reference,
            payment_date: now,
            status: PaymentStatus::Completed,
            notes: format!("Payment for invoice {}", invoice.invoice_number),
        })
    }
}

/// Parses `requested` and applies [`InvoiceLifecycle::transition`].
///
/// # Errors
///
/// Returns `InvoiceError::InvalidStatus` for an unknown status and
/// `InvoiceError::InvalidPayment` for a non-positive payment amount.
pub fn apply_status_transition(
    current: &InvoiceSnapshot,
    requested: &str,
    payment: Option<PaymentDetails>,
    now: DateTime<Utc>,
) -> Result<StatusTransition, InvoiceError> {
    let requested = requested.parse::<InvoiceStatus>()?;
    InvoiceLifecycle::transition(current, requested, payment, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::types::PaymentMethod;
    use chrono::TimeZone;
    use hisaab_shared::types::InvoiceId;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn invoice(status: InvoiceStatus, total: Decimal) -> InvoiceSnapshot {
        InvoiceSnapshot {
            id: InvoiceId::new(),
            invoice_number: "INV-202610-0001".to_string(),
            status,
            total_amount: total,
            paid_amount: Decimal::ZERO,
            balance_amount: total,
            due_date: now() + Duration::days(30),
            sent_date: None,
            updated_at: now() - Duration::days(1),
        }
    }

    fn cash(amount: Option<Decimal>) -> PaymentDetails {
        PaymentDetails {
            amount,
            method: PaymentMethod::Cash,
            reference: None,
        }
    }

    #[test]
    fn test_sent_from_draft_stamps_sent_date() {
        let inv = invoice(InvoiceStatus::Draft, dec!(500));
        let t = InvoiceLifecycle::transition(&inv, InvoiceStatus::Sent, None, now()).unwrap();
        assert_eq!(t.invoice_update.status, Some(InvoiceStatus::Sent));
        assert_eq!(t.invoice_update.sent_date, Some(now()));
        assert!(t.payment_to_create.is_none());
        assert!(t.status_changed());
    }

    #[test]
    fn test_sent_twice_keeps_first_sent_date() {
        let inv = invoice(InvoiceStatus::Draft, dec!(500));
        let first = InvoiceLifecycle::transition(&inv, InvoiceStatus::Sent, None, now()).unwrap();
        let sent = first.invoice_update.apply_to(&inv);

        let later = now() + Duration::hours(3);
        let second = InvoiceLifecycle::transition(&sent, InvoiceStatus::Sent, None, later).unwrap();
        assert_eq!(second.invoice_update.sent_date, None);
        assert_eq!(second.invoice_update.apply_to(&sent).sent_date, Some(now()));
    }

    #[test]
    fn test_sent_from_paid_is_allowed() {
        let inv = invoice(InvoiceStatus::Paid, dec!(500));
        let t = InvoiceLifecycle::transition(&inv, InvoiceStatus::Sent, None, now()).unwrap();
        assert_eq!(t.invoice_update.status, Some(InvoiceStatus::Sent));
        assert_eq!(t.invoice_update.sent_date, None);
    }

    #[test]
    fn test_paid_with_payment_details() {
        let inv = invoice(InvoiceStatus::Draft, dec!(500));
        let t = InvoiceLifecycle::transition(
            &inv,
            InvoiceStatus::Paid,
            Some(cash(Some(dec!(500)))),
            now(),
        )
        .unwrap();

        let after = t.invoice_update.apply_to(&inv);
        assert_eq!(after.status, InvoiceStatus::Paid);
        assert_eq!(after.paid_amount, dec!(500));
        assert_eq!(after.balance_amount, Decimal::ZERO);

        let payment = t.payment_to_create.unwrap();
        assert_eq!(payment.amount, dec!(500));
        assert_eq!(payment.method, PaymentMethod::Cash);
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.invoice_id, inv.id);
        assert_eq!(payment.payment_date, now());
        assert_eq!(payment.notes, "Payment for invoice INV-202610-0001");
        assert!(payment.payment_number.starts_with("PAY-20261016-"));
    }

    #[test]
    fn test_paid_without_amount_uses_total() {
        let inv = invoice(InvoiceStatus::Sent, dec!(1180));
        let t =
            InvoiceLifecycle::transition(&inv, InvoiceStatus::Paid, Some(cash(None)), now()).unwrap();
        assert_eq!(t.payment_to_create.unwrap().amount, dec!(1180));
    }

    #[test]
    fn test_paid_without_details_creates_no_payment() {
        let inv = invoice(InvoiceStatus::Sent, dec!(1180));
        let t = InvoiceLifecycle::transition(&inv, InvoiceStatus::Paid, None, now()).unwrap();
        assert!(t.payment_to_create.is_none());
        assert_eq!(t.invoice_update.paid_amount, Some(dec!(1180)));
    }

    #[test]
    fn test_paid_rejects_non_positive_amount() {
        let inv = invoice(InvoiceStatus::Sent, dec!(100));
        for amount in [dec!(0), dec!(-5)] {
            let err = InvoiceLifecycle::transition(
                &inv,
                InvoiceStatus::Paid,
                Some(cash(Some(amount))),
                now(),
            )
            .unwrap_err();
            assert!(matches!(err, InvoiceError::InvalidPayment(a) if a == amount));
        }
    }

    #[test]
    fn test_payment_details_ignored_for_other_statuses() {
        let inv = invoice(InvoiceStatus::Draft, dec!(100));
        let t = InvoiceLifecycle::transition(
            &inv,
            InvoiceStatus::Sent,
            Some(cash(Some(dec!(-1)))),
            now(),
        )
        .unwrap();
        assert!(t.payment_to_create.is_none());
    }

    #[test]
    fn test_overdue_before_due_date_is_silent() {
        let inv = invoice(InvoiceStatus::Sent, dec!(100));
        let t = InvoiceLifecycle::transition(&inv, InvoiceStatus::Overdue, None, now()).unwrap();
        assert_eq!(t.invoice_update.status, None);
        assert!(!t.status_changed());
        assert_eq!(t.invoice_update.updated_at, now());
        assert_eq!(t.invoice_update.apply_to(&inv).status, InvoiceStatus::Sent);
    }

    #[test]
    fn test_overdue_after_due_date() {
        let inv = invoice(InvoiceStatus::Sent, dec!(100));
        let later = inv.due_date + Duration::seconds(1);
        let t = InvoiceLifecycle::transition(&inv, InvoiceStatus::Overdue, None, later).unwrap();
        assert_eq!(t.invoice_update.status, Some(InvoiceStatus::Overdue));
    }

    #[test]
    fn test_overdue_exactly_at_due_date_is_not_past_due() {
        let inv = invoice(InvoiceStatus::Sent, dec!(100));
        let t =
            InvoiceLifecycle::transition(&inv, InvoiceStatus::Overdue, None, inv.due_date).unwrap();
        assert!(!t.status_changed());
    }

    #[test]
    fn test_cancelled_restores_balance() {
        let mut inv = invoice(InvoiceStatus::Paid, dec!(750));
        inv.paid_amount = dec!(750);
        inv.balance_amount = Decimal::ZERO;
        let t = InvoiceLifecycle::transition(&inv, InvoiceStatus::Cancelled, None, now()).unwrap();
        let after = t.invoice_update.apply_to(&inv);
        assert_eq!(after.paid_amount, Decimal::ZERO);
        assert_eq!(after.balance_amount, dec!(750));
        assert_eq!(after.status, InvoiceStatus::Cancelled);
    }

    #[test]
    fn test_draft_has_no_side_effects() {
        let inv = invoice(InvoiceStatus::Sent, dec!(100));
        let t = InvoiceLifecycle::transition(&inv, InvoiceStatus::Draft, None, now()).unwrap();
        assert_eq!(t.invoice_update.status, Some(InvoiceStatus::Draft));
        assert_eq!(t.invoice_update.sent_date, None);
        assert_eq!(t.invoice_update.paid_amount, None);
        assert_eq!(t.invoice_update.balance_amount, None);
    }

    #[test]
    fn test_apply_status_transition_parses_text() {
        let inv = invoice(InvoiceStatus::Draft, dec!(100));
        let t = apply_status_transition(&inv, "sent", None, now()).unwrap();
        assert_eq!(t.requested, InvoiceStatus::Sent);

        let err = apply_status_transition(&inv, "ARCHIVED", None, now()).unwrap_err();
        assert!(matches!(err, InvoiceError::InvalidStatus(_)));
    }

    #[test]
    fn test_due_date() {
        assert_eq!(
            InvoiceLifecycle::due_date(now(), 30),
            Utc.with_ymd_and_hms(2026, 11, 15, 12, 0, 0).unwrap()
        );
        assert_eq!(InvoiceLifecycle::due_date(now(), 0), now());
    }
}
