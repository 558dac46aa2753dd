//! Invoice lifecycle for Hisaab.
//!
//! This module implements the invoice status state machine and the
//! payment it records when an invoice is paid.
//!
//! # Modules
//!
//! - `types` - Invoice domain types (InvoiceStatus, StatusTransition, PaymentDraft)
//! - `error` - Invoice-specific error types
//! - `transition` - Status transition rules

pub mod error;
pub mod transition;
pub mod types;

#[cfg(test)]
mod transition_props;

pub use error::InvoiceError;
pub use transition::{InvoiceLifecycle, apply_status_transition};
pub use types::{
    InvoiceSnapshot, InvoiceStatus, InvoiceUpdate, PaymentDetails, PaymentDraft, PaymentMethod,
    PaymentStatus, StatusTransition,
};
