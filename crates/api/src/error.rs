//! Error to HTTP response mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hisaab_db::RepositoryError;
use hisaab_shared::AppError;
use serde_json::json;
use tracing::error;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// An application error on its way out as an HTTP response.
///
/// The body is always `{"error": <ERROR_KIND>, "message": <text>}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Shorthand for an `INVALID_INPUT` error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self(AppError::InvalidInput(message.into()))
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = match &self.0 {
            AppError::NotFound(m)
            | AppError::InvalidInput(m)
            | AppError::ConstraintViolation(m)
            | AppError::PersistenceFailure(m)
            | AppError::Internal(m) => m.clone(),
        };

        if self.0.is_server_error() {
            error!(kind = self.0.error_kind(), error = %message, "Request failed");
        }

        (
            status,
            Json(json!({
                "error": self.0.error_kind(),
                "message": message,
            })),
        )
            .into_response()
    }
}
