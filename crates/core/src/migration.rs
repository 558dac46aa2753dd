//! One-shot currency migration plan.
//!
//! Converts every stored money amount from the legacy currency by a fixed
//! rate and normalises the data that came with it: party countries left
//! blank or set to a US spelling, and items imported with a zero GST rate.
//!
//! Applying a plan twice multiplies twice. Callers run it exactly once.

use std::fmt;

use hisaab_shared::AppError;
use hisaab_shared::types::Currency;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::gst::validate_rate;

/// Country spellings carried over from the USD era, compared case-insensitively.
const LEGACY_COUNTRIES: [&str; 4] = ["us", "usa", "united states", "united states of america"];

/// Errors raised while building a migration plan.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MigrationError {
    /// Conversion rate is zero or negative.
    #[error("Conversion rate must be positive, got {0}")]
    NonPositiveRate(Decimal),

    /// Default GST rate is outside 0 to 100.
    #[error("Default GST rate must be between 0 and 100, got {0}")]
    InvalidDefaultGstRate(Decimal),

    /// Default country is blank.
    #[error("Default country cannot be blank")]
    BlankDefaultCountry,
}

impl From<MigrationError> for AppError {
    fn from(err: MigrationError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// A validated currency migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    rate: Decimal,
    from: Currency,
    to: Currency,
    default_country: String,
    default_gst_rate: Decimal,
}

impl MigrationPlan {
    /// Builds a USD to INR plan.
    ///
    /// # Errors
    ///
    /// Returns `MigrationError` for a non-positive rate, an out-of-range
    /// default GST rate, or a blank default country.
    pub fn new(
        rate: Decimal,
        default_country: impl Into<String>,
        default_gst_rate: Decimal,
    ) -> Result<Self, MigrationError> {
        if rate <= Decimal::ZERO {
            return Err(MigrationError::NonPositiveRate(rate));
        }
        validate_rate(default_gst_rate)
            .map_err(|_| MigrationError::InvalidDefaultGstRate(default_gst_rate))?;
        let default_country = default_country.into();
        if default_country.trim().is_empty() {
            return Err(MigrationError::BlankDefaultCountry);
        }

        Ok(Self {
            rate,
            from: Currency::Usd,
            to: Currency::Inr,
            default_country,
            default_gst_rate,
        })
    }

    /// Multiplier applied to every amount.
    #[must_use]
    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// Currency amounts are stored in before the migration.
    #[must_use]
    pub fn from_currency(&self) -> Currency {
        self.from
    }

    /// Currency amounts are stored in after the migration.
    #[must_use]
    pub fn to_currency(&self) -> Currency {
        self.to
    }

    /// Country written over blank and legacy values.
    #[must_use]
    pub fn default_country(&self) -> &str {
        &self.default_country
    }

    /// GST rate written over zero rates.
    #[must_use]
    pub fn default_gst_rate(&self) -> Decimal {
        self.default_gst_rate
    }

    /// Lower-cased, trimmed country values replaced by the default country.
    ///
    /// Covers the US spellings and the empty string; `NULL` is replaced too.
    pub fn replaced_countries(&self) -> impl Iterator<Item = &'static str> {
        LEGACY_COUNTRIES.into_iter().chain([""])
    }
}

/// Rows touched by a migration, per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Party credit limits converted.
    pub parties: u64,
    /// Party countries replaced.
    pub party_countries: u64,
    /// Item prices converted.
    pub items: u64,
    /// Item GST rates backfilled.
    pub item_gst_rates: u64,
    /// Transactions converted.
    pub transactions: u64,
    /// Transaction lines converted.
    pub transaction_items: u64,
    /// Invoices converted.
    pub invoices: u64,
    /// Invoice lines converted.
    pub invoice_items: u64,
    /// Payments converted.
    pub payments: u64,
}

impl MigrationReport {
    /// Rows with converted amounts, across all tables.
    #[must_use]
    pub fn converted_rows(&self) -> u64 {
        self.parties
            + self.items
            + self.transactions
            + self.transaction_items
            + self.invoices
            + self.invoice_items
            + self.payments
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "parties:           {}", self.parties)?;
        writeln!(f, "party countries:   {}", self.party_countries)?;
        writeln!(f, "items:             {}", self.items)?;
        writeln!(f, "item GST rates:    {}", self.item_gst_rates)?;
        writeln!(f, "transactions:      {}", self.transactions)?;
        writeln!(f, "transaction items: {}", self.transaction_items)?;
        writeln!(f, "invoices:          {}", self.invoices)?;
        writeln!(f, "invoice items:     {}", self.invoice_items)?;
        write!(f, "payments:          {}", self.payments)
    }
}
