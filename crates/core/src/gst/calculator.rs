use rust_decimal::Decimal;

use super::breakdown::GstBreakdown;
use super::error::GstError;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;
const TWO: Decimal = Decimal::TWO;

/// Computes GST on `amount` at `rate_percent`.
///
/// A rate of zero is a valid exempt supply and yields [`GstBreakdown::ZERO`].
///
/// # Errors
///
/// Returns `GstError` for a negative amount, a rate outside `0..=100`, or
/// an amount whose tax overflows.
pub fn compute_gst(
    amount: Decimal,
    rate_percent: Decimal,
    inter_state: bool,
) -> Result<GstBreakdown, GstError> {
    if amount < Decimal::ZERO {
        return Err(GstError::NegativeAmount(amount));
    }
    validate_rate(rate_percent)?;

    let total = amount
        .checked_mul(rate_percent)
        .and_then(|tax| tax.checked_div(HUNDRED))
        .ok_or(GstError::Overflow(amount))?;
    Ok(split_tax(total, inter_state))
}

/// Splits an already computed tax total into its components.
#[must_use]
pub fn split_tax(total: Decimal, inter_state: bool) -> GstBreakdown {
    if inter_state {
        GstBreakdown {
            cgst: Decimal::ZERO,
            sgst: Decimal::ZERO,
            igst: total,
            total,
        }
    } else {
        let half = total / TWO;
        GstBreakdown {
            cgst: half,
            sgst: half,
            igst: Decimal::ZERO,
            total,
        }
    }
}

/// Checks that a rate lies within `0..=100` percent.
///
/// # Errors
///
/// Returns `GstError::RateOutOfRange` otherwise.
pub fn validate_rate(rate_percent: Decimal) -> Result<(), GstError> {
    if rate_percent < Decimal::ZERO || rate_percent > HUNDRED {
        return Err(GstError::RateOutOfRange(rate_percent));
    }
    Ok(())
}

/// Returns true when supplier and recipient states differ.
///
/// States are compared as stored, with no trimming or case folding.
#[must_use]
pub fn is_inter_state(supplier_state: &str, recipient_state: &str) -> bool {
    supplier_state != recipient_state
}
