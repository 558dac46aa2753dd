//! `SeaORM` entity definitions.

pub mod categories;
pub mod invoice_items;
pub mod invoices;
pub mod items;
pub mod parties;
pub mod payments;
pub mod sea_orm_active_enums;
pub mod transaction_items;
pub mod transactions;
