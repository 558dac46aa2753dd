//! Invoice error types.

use hisaab_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::invoice::types::InvoiceStatus;

/// Errors that can occur during invoice operations.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Requested status is not one of the lifecycle states.
    #[error("Invalid invoice status: {0:?}")]
    InvalidStatus(String),

    /// Supplied payment amount is zero or negative.
    #[error("Payment amount must be positive, got {0}")]
    InvalidPayment(Decimal),

    /// Invoice not found.
    #[error("Invoice {0} not found")]
    InvoiceNotFound(Uuid),

    /// The transaction already has an invoice.
    #[error("Transaction {0} is already invoiced")]
    AlreadyInvoiced(Uuid),

    /// Only draft invoices can be modified.
    #[error("Invoice is {0}; only DRAFT invoices can be edited")]
    NotEditable(InvoiceStatus),

    /// Only draft invoices can be deleted.
    #[error("Invoice is {0}; only DRAFT invoices can be deleted")]
    NotDeletable(InvoiceStatus),
}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        let message = err.to_string();
        match err {
            InvoiceError::InvalidStatus(_) | InvoiceError::InvalidPayment(_) => {
                Self::InvalidInput(message)
            }
            InvoiceError::InvoiceNotFound(_) => Self::NotFound(message),
            InvoiceError::AlreadyInvoiced(_)
            | InvoiceError::NotEditable(_)
            | InvoiceError::NotDeletable(_) => Self::ConstraintViolation(message),
        }
    }
}
