//! Dashboard data types.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::invoice::InvoiceStatus;

/// Dashboard summary response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Sum of SALE transaction totals.
    pub total_sales: Decimal,
    /// Sum of PURCHASE transaction totals.
    pub total_purchases: Decimal,
    /// Outstanding balance on SENT and OVERDUE invoices.
    pub receivables: Decimal,
    /// Invoice counts per status.
    pub invoice_counts: InvoiceStatusCounts,
    /// Active customers.
    pub active_customers: u64,
    /// Active suppliers and vendors.
    pub active_suppliers: u64,
    /// Active items at or below their reorder level.
    pub low_stock_items: u64,
    /// Completed payments received since the start of the month.
    pub payments_this_month: Decimal,
}

/// Invoice counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceStatusCounts {
    /// Draft invoices.
    pub draft: u64,
    /// Sent invoices.
    pub sent: u64,
    /// Paid invoices.
    pub paid: u64,
    /// Overdue invoices.
    pub overdue: u64,
    /// Cancelled invoices.
    pub cancelled: u64,
}

impl InvoiceStatusCounts {
    /// Adds `count` invoices of `status`.
    pub fn record(&mut self, status: InvoiceStatus, count: u64) {
        let slot = match status {
            InvoiceStatus::Draft => &mut self.draft,
            InvoiceStatus::Sent => &mut self.sent,
            InvoiceStatus::Paid => &mut self.paid,
            InvoiceStatus::Overdue => &mut self.overdue,
            InvoiceStatus::Cancelled => &mut self.cancelled,
        };
        *slot += count;
    }

    /// Total invoices across all statuses.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.draft + self.sent + self.paid + self.overdue + self.cancelled
    }
}

/// Midnight UTC on the first day of the month containing `now`.
#[must_use]
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}
