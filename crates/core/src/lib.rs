//! Core business logic for Hisaab.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `invoice` - Invoice lifecycle and status transitions
//! - `gst` - GST computation and CGST/SGST/IGST splitting
//! - `billing` - Line item and aggregate totals
//! - `category` - Category tree rules
//! - `stock` - Inventory movements
//! - `migration` - One-shot currency migration plan
//! - `dashboard` - Dashboard summary types
//! - `numbering` - Document number formats

pub mod billing;
pub mod category;
pub mod dashboard;
pub mod gst;
pub mod invoice;
pub mod migration;
pub mod numbering;
pub mod stock;
