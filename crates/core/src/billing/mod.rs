//! Billing totals for transactions and invoices.
//!
//! Line amounts are rounded to paise as they are resolved, and aggregates
//! are summed from the rounded lines, so persisted aggregates always equal
//! the sum of persisted lines.
//!
//! # Modules
//!
//! - `types` - Line inputs, resolved lines and totals
//! - `error` - Billing validation errors
//! - `service` - Line resolution and aggregate checks

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::BillingError;
pub use service::BillingService;
pub use types::{BillTotals, LineInput, ResolvedLine, SuppliedTotals, TransactionType};
