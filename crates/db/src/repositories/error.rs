//! Repository error type.

use hisaab_core::billing::BillingError;
use hisaab_core::category::CategoryError;
use hisaab_core::gst::GstError;
use hisaab_core::invoice::InvoiceError;
use hisaab_core::migration::MigrationError;
use hisaab_core::stock::StockError;
use hisaab_shared::AppError;
use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

/// Errors returned by repositories.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Referenced row does not exist.
    #[error("{entity} {id}")]
    NotFound {
        /// Entity name, e.g. `Party`.
        entity: &'static str,
        /// Identifier that did not resolve.
        id: Uuid,
    },

    /// The operation would break a uniqueness or reference rule.
    #[error("{0}")]
    Conflict(String),

    /// Invoice rule violated.
    #[error(transparent)]
    Invoice(#[from] InvoiceError),

    /// Line or totals validation failed.
    #[error(transparent)]
    Billing(#[from] BillingError),

    /// Category tree rule violated.
    #[error(transparent)]
    Category(#[from] CategoryError),

    /// Stock movement rejected.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// GST input rejected.
    #[error(transparent)]
    Gst(#[from] GstError),

    /// Currency migration plan rejected.
    #[error(transparent)]
    Migration(#[from] MigrationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    /// Shorthand for [`RepositoryError::NotFound`].
    #[must_use]
    pub const fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

/// Result type alias for repositories.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => Self::NotFound(err.to_string()),
            RepositoryError::Conflict(message) => Self::ConstraintViolation(message),
            RepositoryError::Invoice(e) => e.into(),
            RepositoryError::Billing(e) => e.into(),
            RepositoryError::Category(e) => e.into(),
            RepositoryError::Stock(e) => e.into(),
            RepositoryError::Gst(e) => e.into(),
            RepositoryError::Migration(e) => e.into(),
            RepositoryError::Database(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(detail)) => {
                    Self::ConstraintViolation(format!("Duplicate value: {detail}"))
                }
                Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                    Self::ConstraintViolation(format!("Referenced row conflict: {detail}"))
                }
                _ => Self::PersistenceFailure(e.to_string()),
            },
        }
    }
}
