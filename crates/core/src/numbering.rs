//! Document number formats.
//!
//! - Invoices: `INV-YYYYMM-NNNN`, a zero-padded sequence restarting each month.
//! - Transactions: `SAL-YYYYMM-NNNN` / `PUR-YYYYMM-NNNN`, same scheme per type.
//! - Payments: `PAY-YYYYMMDD-XXXXXXXX`, a random hex suffix.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Prefix for invoice numbers.
pub const INVOICE_PREFIX: &str = "INV";

/// Prefix for payment numbers.
pub const PAYMENT_PREFIX: &str = "PAY";

/// Prefix shared by every document of one kind issued in the month of `date`.
///
/// `month_prefix("INV", 2026-10-16)` is `INV-202610-`.
#[must_use]
pub fn month_prefix(kind: &str, date: DateTime<Utc>) -> String {
    format!("{kind}-{}-", date.format("%Y%m"))
}

/// Formats a monthly sequenced number such as `INV-202610-0007`.
#[must_use]
pub fn sequenced_number(kind: &str, date: DateTime<Utc>, sequence: u32) -> String {
    format!("{}{sequence:04}", month_prefix(kind, date))
}

/// Parses the trailing sequence of a number that starts with `prefix`.
fn parse_sequence(number: &str, prefix: &str) -> Option<u32> {
    number.strip_prefix(prefix)?.parse().ok()
}

/// Returns the sequence that follows the latest number issued under `prefix`.
#[must_use]
pub fn next_sequence(latest: Option<&str>, prefix: &str) -> u32 {
    latest
        .and_then(|number| parse_sequence(number, prefix))
        .map_or(1, |seq| seq.saturating_add(1))
}

/// Generates a payment number for a payment made at `date`.
#[must_use]
pub fn payment_number(date: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{PAYMENT_PREFIX}-{}-{}", date.format("%Y%m%d"), &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn oct_16() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_invoice_number_format() {
        assert_eq!(sequenced_number(INVOICE_PREFIX, oct_16(), 1), "INV-202610-0001");
        assert_eq!(sequenced_number(INVOICE_PREFIX, oct_16(), 42), "INV-202610-0042");
        assert_eq!(sequenced_number(INVOICE_PREFIX, oct_16(), 12345), "INV-202610-12345");
    }

    #[test]
    fn test_transaction_prefixes() {
        assert_eq!(sequenced_number("SAL", oct_16(), 3), "SAL-202610-0003");
        assert_eq!(month_prefix("PUR", oct_16()), "PUR-202610-");
    }

    #[test]
    fn test_next_sequence() {
        let prefix = month_prefix(INVOICE_PREFIX, oct_16());
        assert_eq!(next_sequence(None, &prefix), 1);
        assert_eq!(next_sequence(Some("INV-202610-0009"), &prefix), 10);
        // A number from another month does not continue this month's sequence.
        assert_eq!(next_sequence(Some("INV-202609-0009"), &prefix), 1);
        assert_eq!(next_sequence(Some("INV-202610-abcd"), &prefix), 1);
    }

    #[test]
    fn test_payment_number_format() {
        let number = payment_number(oct_16());
        assert!(number.starts_with("PAY-20261016-"));
        let suffix = number.trim_start_matches("PAY-20261016-");
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_payment_numbers_differ() {
        assert_ne!(payment_number(oct_16()), payment_number(oct_16()));
    }
}
