use std::ops::{Add, AddAssign};

use hisaab_shared::types::round_money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GST charged on a taxable amount, split by component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstBreakdown {
    /// Central GST.
    pub cgst: Decimal,
    /// State GST.
    pub sgst: Decimal,
    /// Integrated GST.
    pub igst: Decimal,
    /// Sum of the components.
    pub total: Decimal,
}

impl GstBreakdown {
    /// No tax.
    pub const ZERO: Self = Self {
        cgst: Decimal::ZERO,
        sgst: Decimal::ZERO,
        igst: Decimal::ZERO,
        total: Decimal::ZERO,
    };

    /// Returns true when no tax is charged.
    #[must_use]
    pub fn is_exempt(&self) -> bool {
        self.total.is_zero()
    }

    /// Returns true when the tax is charged as IGST.
    #[must_use]
    pub fn is_inter_state(&self) -> bool {
        !self.igst.is_zero()
    }

    /// Rounds each component to paise.
    ///
    /// Components are rounded independently, so a rounded `cgst + sgst` can
    /// differ from the rounded `total` by one paisa.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            cgst: round_money(self.cgst),
            sgst: round_money(self.sgst),
            igst: round_money(self.igst),
            total: round_money(self.total),
        }
    }

    /// Display label, e.g. `CGST 90.00 + SGST 90.00`.
    ///
    /// A zero breakdown renders as `GST Exempt`, never as a zero split.
    #[must_use]
    pub fn label(&self) -> String {
        let rounded = self.rounded();
        if self.is_exempt() {
            "GST Exempt".to_string()
        } else if self.is_inter_state() {
            format!("IGST {:.2}", rounded.igst)
        } else {
            format!("CGST {:.2} + SGST {:.2}", rounded.cgst, rounded.sgst)
        }
    }
}

impl Add for GstBreakdown {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            cgst: self.cgst + rhs.cgst,
            sgst: self.sgst + rhs.sgst,
            igst: self.igst + rhs.igst,
            total: self.total + rhs.total,
        }
    }
}

impl AddAssign for GstBreakdown {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for GstBreakdown {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
