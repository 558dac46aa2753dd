//! Billing validation errors.

use hisaab_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::gst::GstError;

/// Errors raised while resolving lines and totals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BillingError {
    /// No lines were supplied.
    #[error("At least one line item is required")]
    EmptyLines,

    /// Quantity is zero or negative.
    #[error("Line {line}: quantity must be positive")]
    NonPositiveQuantity {
        /// 1-based line number.
        line: usize,
    },

    /// A price or discount is negative.
    #[error("Line {line}: {field} cannot be negative")]
    NegativeAmount {
        /// 1-based line number.
        line: usize,
        /// Offending field.
        field: &'static str,
    },

    /// Line gross is beyond what a money column holds.
    #[error("Line {line}: amount exceeds the maximum of {max}")]
    AmountOutOfRange {
        /// 1-based line number.
        line: usize,
        /// Largest storable amount.
        max: Decimal,
    },

    /// Discount is larger than the line gross.
    #[error("Line {line}: discount {discount} exceeds gross amount {gross}")]
    DiscountExceedsGross {
        /// 1-based line number.
        line: usize,
        /// Line discount.
        discount: Decimal,
        /// Line gross amount.
        gross: Decimal,
    },

    /// Tax rate is invalid.
    #[error("Line {line}: {source}")]
    InvalidTaxRate {
        /// 1-based line number.
        line: usize,
        /// Underlying GST error.
        source: GstError,
    },

    /// A supplied aggregate disagrees with the recomputed one.
    #[error("{field} mismatch: supplied {supplied}, computed {computed}")]
    TotalsMismatch {
        /// Aggregate name.
        field: &'static str,
        /// Value sent by the caller.
        supplied: Decimal,
        /// Value computed from the lines.
        computed: Decimal,
    },
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}
