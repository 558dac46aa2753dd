//! Money helpers with decimal precision.
//!
//! Never use floating-point for money calculations. Amounts are
//! `rust_decimal::Decimal` end to end, kept unrounded through a computation
//! and rounded once with [`round_money`] when persisted or displayed.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places stored for every money column.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(14,2)` money column holds: `999999999999.99`.
pub const MAX_MONEY: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, MONEY_SCALE);

/// Rounds an amount to paise using round-half-up.
///
/// Midpoints round away from zero, so `0.125` becomes `0.13` and
/// `-0.125` becomes `-0.13`.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// ISO 4217 currency codes the system has stored amounts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Indian Rupee, the operating currency.
    Inr,
    /// US Dollar, the legacy currency before the INR migration.
    Usd,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inr => write!(f, "INR"),
            Self::Usd => write!(f, "USD"),
        }
    }
}
