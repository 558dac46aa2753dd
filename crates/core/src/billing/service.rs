//! Line resolution and aggregate checks.

use hisaab_shared::types::{MAX_MONEY, round_money};
use rust_decimal::{Decimal, RoundingStrategy};

use super::error::BillingError;
use super::types::{BillTotals, LineInput, ResolvedLine, SuppliedTotals};
use crate::gst::{compute_gst, validate_rate};

/// Decimal places stored for quantities.
pub const QUANTITY_SCALE: u32 = 3;

/// Stateless service for billing arithmetic.
pub struct BillingService;

impl BillingService {
    /// Validates every line and computes the aggregates.
    ///
    /// # Errors
    ///
    /// Returns `BillingError` for an empty list or the first invalid line.
    pub fn resolve_lines(
        lines: &[LineInput],
    ) -> Result<(Vec<ResolvedLine>, BillTotals), BillingError> {
        if lines.is_empty() {
            return Err(BillingError::EmptyLines);
        }

        let resolved = lines
            .iter()
            .enumerate()
            .map(|(idx, line)| Self::resolve_line(idx + 1, line))
            .collect::<Result<Vec<_>, _>>()?;
        let totals = Self::calculate_totals(&resolved);

        Ok((resolved, totals))
    }

    /// Resolves a single line; `line` is its 1-based position for error messages.
    ///
    /// # Errors
    ///
    /// Returns `BillingError` if the line is invalid.
    pub fn resolve_line(line: usize, input: &LineInput) -> Result<ResolvedLine, BillingError> {
        let quantity = input
            .quantity
            .round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        if quantity <= Decimal::ZERO {
            return Err(BillingError::NonPositiveQuantity { line });
        }
        if input.unit_price < Decimal::ZERO {
            return Err(BillingError::NegativeAmount {
                line,
                field: "unit_price",
            });
        }
        if input.discount < Decimal::ZERO {
            return Err(BillingError::NegativeAmount {
                line,
                field: "discount",
            });
        }
        validate_rate(input.tax_rate)
            .map_err(|source| BillingError::InvalidTaxRate { line, source })?;

        let unit_price = round_money(input.unit_price);
        let discount = round_money(input.discount);
        let gross = quantity
            .checked_mul(unit_price)
            .map(round_money)
            .filter(|gross| *gross <= MAX_MONEY)
            .ok_or(BillingError::AmountOutOfRange {
                line,
                max: MAX_MONEY,
            })?;
        if discount > gross {
            return Err(BillingError::DiscountExceedsGross {
                line,
                discount,
                gross,
            });
        }

        let taxable = gross - discount;
        let tax_amount = compute_gst(taxable, input.tax_rate, false)
            .map_err(|source| BillingError::InvalidTaxRate { line, source })?
            .rounded()
            .total;

        Ok(ResolvedLine {
            item_id: input.item_id,
            quantity,
            unit_price,
            discount,
            tax_rate: input.tax_rate,
            gross,
            taxable,
            tax_amount,
            line_total: taxable + tax_amount,
        })
    }

    /// Sums resolved lines into aggregates.
    #[must_use]
    pub fn calculate_totals(lines: &[ResolvedLine]) -> BillTotals {
        lines.iter().fold(BillTotals::default(), |acc, line| BillTotals {
            subtotal: acc.subtotal + line.gross,
            discount_amount: acc.discount_amount + line.discount,
            tax_amount: acc.tax_amount + line.tax_amount,
            total_amount: acc.total_amount + line.line_total,
        })
    }

    /// Checks caller-supplied aggregates against the computed ones.
    ///
    /// Supplied values are rounded to paise before comparison.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::TotalsMismatch` for the first disagreeing field.
    pub fn verify_supplied(
        computed: &BillTotals,
        supplied: &SuppliedTotals,
    ) -> Result<(), BillingError> {
        let checks = [
            ("subtotal", supplied.subtotal, computed.subtotal),
            (
                "discount_amount",
                supplied.discount_amount,
                computed.discount_amount,
            ),
            ("tax_amount", supplied.tax_amount, computed.tax_amount),
            ("total_amount", supplied.total_amount, computed.total_amount),
        ];

        for (field, supplied, computed) in checks {
            if let Some(supplied) = supplied
                && round_money(supplied) != computed
            {
                return Err(BillingError::TotalsMismatch {
                    field,
                    supplied,
                    computed,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::types::TransactionType;
    use hisaab_shared::types::ItemId;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn line(quantity: Decimal, unit_price: Decimal, discount: Decimal, rate: Decimal) -> LineInput {
        LineInput {
            item_id: ItemId::new(),
            quantity,
            unit_price,
            discount,
            tax_rate: rate,
        }
    }

    #[test]
    fn test_single_line() {
        let resolved =
            BillingService::resolve_line(1, &line(dec!(2), dec!(500), dec!(0), dec!(18))).unwrap();
        assert_eq!(resolved.gross, dec!(1000));
        assert_eq!(resolved.taxable, dec!(1000));
        assert_eq!(resolved.tax_amount, dec!(180));
        assert_eq!(resolved.line_total, dec!(1180));
    }

    #[test]
    fn test_discount_reduces_taxable() {
        let resolved =
            BillingService::resolve_line(1, &line(dec!(1), dec!(1000), dec!(100), dec!(5))).unwrap();
        assert_eq!(resolved.taxable, dec!(900));
        assert_eq!(resolved.tax_amount, dec!(45));
        assert_eq!(resolved.line_total, dec!(945));
    }

    #[test]
    fn test_line_amounts_are_rounded_half_up() {
        // 3 x 3.33 = 9.99; 9.99 x 12.5% = 1.24875 -> 1.25
        let resolved =
            BillingService::resolve_line(1, &line(dec!(3), dec!(3.33), dec!(0), dec!(12.5)))
                .unwrap();
        assert_eq!(resolved.gross, dec!(9.99));
        assert_eq!(resolved.tax_amount, dec!(1.25));
        assert_eq!(resolved.line_total, dec!(11.24));
    }

    #[test]
    fn test_totals_sum_lines() {
        let (lines, totals) = BillingService::resolve_lines(&[
            line(dec!(2), dec!(500), dec!(0), dec!(18)),
            line(dec!(1), dec!(200), dec!(20), dec!(5)),
            line(dec!(4), dec!(25), dec!(0), dec!(0)),
        ])
        .unwrap();

        assert_eq!(lines.len(), 3);
        assert_eq!(totals.subtotal, dec!(1300));
        assert_eq!(totals.discount_amount, dec!(20));
        assert_eq!(totals.tax_amount, dec!(189));
        assert_eq!(totals.total_amount, dec!(1469));
        assert_eq!(
            totals.total_amount,
            totals.subtotal - totals.discount_amount + totals.tax_amount
        );
    }

    #[test]
    fn test_gst_split_of_totals() {
        let (_, totals) =
            BillingService::resolve_lines(&[line(dec!(1), dec!(1000), dec!(0), dec!(18))]).unwrap();
        let intra = totals.gst_split(false);
        assert_eq!((intra.cgst, intra.sgst, intra.igst), (dec!(90), dec!(90), dec!(0)));
        let inter = totals.gst_split(true);
        assert_eq!((inter.cgst, inter.sgst, inter.igst), (dec!(0), dec!(0), dec!(180)));
    }

    #[test]
    fn test_empty_lines_rejected() {
        assert_eq!(
            BillingService::resolve_lines(&[]),
            Err(BillingError::EmptyLines)
        );
    }

    #[rstest]
    #[case(line(dec!(0), dec!(10), dec!(0), dec!(18)), "quantity must be positive")]
    #[case(line(dec!(-1), dec!(10), dec!(0), dec!(18)), "quantity must be positive")]
    #[case(line(dec!(1), dec!(-10), dec!(0), dec!(18)), "unit_price cannot be negative")]
    #[case(line(dec!(1), dec!(10), dec!(-1), dec!(18)), "discount cannot be negative")]
    #[case(line(dec!(1), dec!(10), dec!(11), dec!(18)), "exceeds gross amount")]
    #[case(line(dec!(1), dec!(10), dec!(0), dec!(101)), "GST rate must be between")]
    fn test_invalid_lines(#[case] input: LineInput, #[case] message: &str) {
        let err = BillingService::resolve_lines(&[input]).unwrap_err();
        assert!(err.to_string().starts_with("Line 1: "), "{err}");
        assert!(err.to_string().contains(message), "{err}");
    }

    #[test]
    fn test_error_reports_line_number() {
        let err = BillingService::resolve_lines(&[
            line(dec!(1), dec!(10), dec!(0), dec!(18)),
            line(dec!(0), dec!(10), dec!(0), dec!(18)),
        ])
        .unwrap_err();
        assert_eq!(err, BillingError::NonPositiveQuantity { line: 2 });
    }

    #[rstest]
    #[case(dec!(1000000000000), dec!(1000000000000000000))]
    #[case(dec!(1), Decimal::MAX)]
    #[case(dec!(2), dec!(500000000000))]
    fn test_oversized_lines_rejected(#[case] quantity: Decimal, #[case] unit_price: Decimal) {
        let err = BillingService::resolve_line(1, &line(quantity, unit_price, dec!(0), dec!(18)))
            .unwrap_err();
        assert_eq!(
            err,
            BillingError::AmountOutOfRange {
                line: 1,
                max: MAX_MONEY
            }
        );
    }

    #[test]
    fn test_largest_storable_line_resolves() {
        let resolved =
            BillingService::resolve_line(1, &line(dec!(1), MAX_MONEY, dec!(0), dec!(0))).unwrap();
        assert_eq!(resolved.gross, MAX_MONEY);
        assert_eq!(resolved.line_total, MAX_MONEY);
    }

    #[test]
    fn test_verify_supplied() {
        let totals = BillTotals {
            subtotal: dec!(1000),
            discount_amount: dec!(0),
            tax_amount: dec!(180),
            total_amount: dec!(1180),
        };

        assert!(BillingService::verify_supplied(&totals, &SuppliedTotals::default()).is_ok());
        assert!(
            BillingService::verify_supplied(
                &totals,
                &SuppliedTotals {
                    total_amount: Some(dec!(1180.004)),
                    ..SuppliedTotals::default()
                }
            )
            .is_ok()
        );

        let err = BillingService::verify_supplied(
            &totals,
            &SuppliedTotals {
                subtotal: Some(dec!(1000)),
                tax_amount: Some(dec!(18)),
                ..SuppliedTotals::default()
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            BillingError::TotalsMismatch {
                field: "tax_amount",
                supplied: dec!(18),
                computed: dec!(180),
            }
        );
    }

    #[test]
    fn test_transaction_type() {
        assert_eq!("sale".parse::<TransactionType>().unwrap(), TransactionType::Sale);
        assert_eq!(TransactionType::Purchase.number_prefix(), "PUR");
        assert!("REFUND".parse::<TransactionType>().is_err());
    }
}
