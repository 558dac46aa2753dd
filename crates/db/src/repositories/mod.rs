//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every multi-step write runs inside one database transaction.

pub mod category;
pub mod currency;
pub mod dashboard;
pub mod error;
pub mod invoice;
pub mod item;
pub mod party;
pub mod pos;
mod sequence;
pub mod transaction;

pub use category::{CategoryRepository, CreateCategoryInput, UpdateCategoryInput};
pub use currency::{CurrencyMigrationRepository, migrate_in};
pub use dashboard::DashboardRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use invoice::{
    CreateInvoiceInput, InvoiceFilter, InvoiceOptions, InvoiceRepository, InvoiceWithDetails,
    StatusChange,
};
pub use item::{CreateItemInput, ItemFilter, ItemRepository, UpdateItemInput};
pub use party::{CreatePartyInput, PartyFilter, PartyRepository, UpdatePartyInput};
pub use pos::{CheckoutInput, CheckoutReceipt, PosRepository};
pub use transaction::{
    CreateTransactionInput, TransactionFilter, TransactionRepository, TransactionWithItems,
};
