//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Every domain and repository error is mapped into one of these kinds
/// before it reaches a transport layer.
#[derive(Debug, Error)]
pub enum AppError {
    /// Entity identifier did not resolve.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or out-of-domain input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A business rule blocks the operation.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Underlying storage error.
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// Internal error (configuration, startup).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidInput(_) => 400,
            Self::ConstraintViolation(_) => 409,
            Self::PersistenceFailure(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error kind for API responses.
    #[must_use]
    pub const fn error_kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            Self::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true for errors caused by the server rather than the caller.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::PersistenceFailure(_) | Self::Internal(_))
    }
}
