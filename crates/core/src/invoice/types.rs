//! Invoice domain types.
//!
//! This module defines the invoice and payment enums and the values
//! exchanged with the status transition rules.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use hisaab_shared::types::InvoiceId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::invoice::error::InvoiceError;

/// Invoice status in the billing lifecycle.
///
/// Any status may be requested from any other; the side effects are
/// decided by the requested status alone (see `transition`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    /// Invoice is being prepared and its items can be replaced.
    Draft,
    /// Invoice has been sent to the party.
    Sent,
    /// Invoice has been settled in full.
    Paid,
    /// Invoice is past its due date and unpaid.
    Overdue,
    /// Invoice has been cancelled.
    Cancelled,
}

impl InvoiceStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::Sent,
        Self::Paid,
        Self::Overdue,
        Self::Cancelled,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Sent => "SENT",
            Self::Paid => "PAID",
            Self::Overdue => "OVERDUE",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Returns true if the invoice items can still be replaced.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the invoice can be deleted.
    #[must_use]
    pub fn is_deletable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the balance counts as money owed to the business.
    #[must_use]
    pub fn is_receivable(&self) -> bool {
        matches!(self, Self::Sent | Self::Overdue)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = InvoiceError;

    /// Parses a status case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DRAFT" => Ok(Self::Draft),
            "SENT" => Ok(Self::Sent),
            "PAID" => Ok(Self::Paid),
            "OVERDUE" => Ok(Self::Overdue),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(InvoiceError::InvalidStatus(s.to_string())),
        }
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash.
    Cash,
    /// Debit or credit card.
    Card,
    /// Unified Payments Interface.
    Upi,
    /// NEFT/RTGS/IMPS transfer.
    BankTransfer,
    /// Cheque.
    Cheque,
    /// Anything else.
    Other,
}

impl PaymentMethod {
    /// Returns the string representation of the method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Card => "CARD",
            Self::Upi => "UPI",
            Self::BankTransfer => "BANK_TRANSFER",
            Self::Cheque => "CHEQUE",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settlement state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    /// Awaiting settlement.
    Pending,
    /// Settled.
    Completed,
    /// Settlement failed.
    Failed,
    /// Returned to the payer.
    Refunded,
}

impl PaymentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Refunded => "REFUNDED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The invoice fields the status transition reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceSnapshot {
    /// Invoice identifier.
    pub id: InvoiceId,
    /// Human-readable invoice number.
    pub invoice_number: String,
    /// Current status.
    pub status: InvoiceStatus,
    /// Invoice grand total.
    pub total_amount: Decimal,
    /// Amount paid so far.
    pub paid_amount: Decimal,
    /// Amount still owed.
    pub balance_amount: Decimal,
    /// When payment falls due.
    pub due_date: DateTime<Utc>,
    /// When the invoice was first sent.
    pub sent_date: Option<DateTime<Utc>>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Payment details supplied with a request to mark an invoice paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// Amount received; the invoice total when omitted.
    pub amount: Option<Decimal>,
    /// How the payment was made.
    pub method: PaymentMethod,
    /// Bank or UPI reference.
    pub reference: Option<String>,
}

/// Fields to write back to the invoice. `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceUpdate {
    /// New status.
    pub status: Option<InvoiceStatus>,
    /// New sent date.
    pub sent_date: Option<DateTime<Utc>>,
    /// New paid amount.
    pub paid_amount: Option<Decimal>,
    /// New balance.
    pub balance_amount: Option<Decimal>,
    /// Always stamped.
    pub updated_at: DateTime<Utc>,
}

impl InvoiceUpdate {
    /// An update that only stamps `updated_at`.
    #[must_use]
    pub fn touch(now: DateTime<Utc>) -> Self {
        Self {
            status: None,
            sent_date: None,
            paid_amount: None,
            balance_amount: None,
            updated_at: now,
        }
    }

    /// Returns the snapshot as it reads after this update is written.
    #[must_use]
    pub fn apply_to(&self, snapshot: &InvoiceSnapshot) -> InvoiceSnapshot {
        InvoiceSnapshot {
            id: snapshot.id,
            invoice_number: snapshot.invoice_number.clone(),
            status: self.status.unwrap_or(snapshot.status),
            total_amount: snapshot.total_amount,
            paid_amount: self.paid_amount.unwrap_or(snapshot.paid_amount),
            balance_amount: self.balance_amount.unwrap_or(snapshot.balance_amount),
            due_date: snapshot.due_date,
            sent_date: self.sent_date.or(snapshot.sent_date),
            updated_at: self.updated_at,
        }
    }
}

/// A payment row to insert alongside the invoice update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDraft {
    /// Generated `PAY-YYYYMMDD-XXXXXXXX` number.
    pub payment_number: String,
    /// Invoice being paid.
    pub invoice_id: InvoiceId,
    /// Amount received.
    pub amount: Decimal,
    /// How the payment was made.
    pub method: PaymentMethod,
    /// Bank or UPI reference.
    pub reference: Option<String>,
    /// When the payment was received.
    pub payment_date: DateTime<Utc>,
    /// Always `Completed` for payments recorded by a transition.
    pub status: PaymentStatus,
    /// `Payment for invoice <number>`.
    pub notes: String,
}

/// Outcome of a status transition, ready to be persisted atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    /// The status the caller asked for.
    pub requested: InvoiceStatus,
    /// Fields to write to the invoice.
    pub invoice_update: InvoiceUpdate,
    /// Payment to insert, if any.
    pub payment_to_create: Option<PaymentDraft>,
}

impl StatusTransition {
    /// Returns false when the requested status was not applied.
    ///
    /// Only an `OVERDUE` request before the due date leaves the status as is.
    #[must_use]
    pub fn status_changed(&self) -> bool {
        self.invoice_update.status.is_some()
    }
}
