//! GST computation.
//!
//! Intra-state supply splits the tax evenly between CGST and SGST;
//! inter-state supply charges it all as IGST. Amounts stay unrounded
//! until [`GstBreakdown::rounded`].

mod breakdown;
mod calculator;
mod error;

#[cfg(test)]
mod props;

pub use breakdown::GstBreakdown;
pub use calculator::{compute_gst, is_inter_state, split_tax, validate_rate};
pub use error::GstError;
