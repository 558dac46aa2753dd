//! GST error types.

use hisaab_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by GST computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GstError {
    /// Taxable amount is negative.
    #[error("Taxable amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    /// Rate is outside 0 to 100 percent.
    #[error("GST rate must be between 0 and 100, got {0}")]
    RateOutOfRange(Decimal),

    /// Tax on the amount does not fit in a decimal.
    #[error("Taxable amount is too large: {0}")]
    Overflow(Decimal),
}

impl From<GstError> for AppError {
    fn from(err: GstError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}
