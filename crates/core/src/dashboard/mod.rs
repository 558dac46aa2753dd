//! Dashboard summary types.
//!
//! This module provides the figures shown on the billing dashboard:
//! - Sales, purchases and receivables
//! - Invoice counts per status
//! - Party and low-stock counts

pub mod types;

pub use types::*;
