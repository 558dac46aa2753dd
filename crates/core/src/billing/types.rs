//! Billing domain types.

use std::fmt;
use std::str::FromStr;

use hisaab_shared::types::ItemId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::gst::{GstBreakdown, split_tax};

/// Direction of a trade transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Goods sold to a customer.
    Sale,
    /// Goods bought from a supplier.
    Purchase,
}

impl TransactionType {
    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "SALE",
            Self::Purchase => "PURCHASE",
        }
    }

    /// Prefix of the transaction number, e.g. `SAL` in `SAL-202610-0001`.
    #[must_use]
    pub fn number_prefix(&self) -> &'static str {
        match self {
            Self::Sale => "SAL",
            Self::Purchase => "PUR",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SALE" => Ok(Self::Sale),
            "PURCHASE" => Ok(Self::Purchase),
            _ => Err(format!("Unknown transaction type: {s}")),
        }
    }
}

/// A line as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    /// Item sold or bought.
    pub item_id: ItemId,
    /// Quantity, up to three decimal places.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Flat discount on the line.
    #[serde(default)]
    pub discount: Decimal,
    /// GST rate in percent.
    pub tax_rate: Decimal,
}

/// A validated line with its computed amounts, rounded for storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLine {
    /// Item sold or bought.
    pub item_id: ItemId,
    /// Quantity.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Flat discount on the line.
    pub discount: Decimal,
    /// GST rate in percent.
    pub tax_rate: Decimal,
    /// `quantity * unit_price`.
    pub gross: Decimal,
    /// `gross - discount`.
    pub taxable: Decimal,
    /// GST on the taxable amount.
    pub tax_amount: Decimal,
    /// `taxable + tax_amount`.
    pub line_total: Decimal,
}

/// Aggregate amounts of a transaction or invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillTotals {
    /// Sum of line gross amounts.
    pub subtotal: Decimal,
    /// Sum of line discounts.
    pub discount_amount: Decimal,
    /// Sum of line taxes.
    pub tax_amount: Decimal,
    /// Sum of line totals.
    pub total_amount: Decimal,
}

impl BillTotals {
    /// Splits the tax into CGST/SGST or IGST.
    #[must_use]
    pub fn gst_split(&self, inter_state: bool) -> GstBreakdown {
        split_tax(self.tax_amount, inter_state)
    }
}

/// Aggregates a caller may send along with the lines.
///
/// They are never trusted, only checked against the recomputed totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppliedTotals {
    /// Claimed subtotal.
    pub subtotal: Option<Decimal>,
    /// Claimed discount.
    pub discount_amount: Option<Decimal>,
    /// Claimed tax.
    pub tax_amount: Option<Decimal>,
    /// Claimed total.
    pub total_amount: Option<Decimal>,
}
