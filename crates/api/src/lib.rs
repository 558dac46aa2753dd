//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - Validated request extractors
//! - Error to HTTP response mapping

pub mod error;
pub mod extractors;
pub mod routes;
pub mod validation;

use axum::Router;
use hisaab_shared::BillingConfig;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Billing defaults: seller state and payment terms.
    pub billing: Arc<BillingConfig>,
}

impl AppState {
    /// Creates the state from a connection and billing defaults.
    #[must_use]
    pub fn new(db: DatabaseConnection, billing: BillingConfig) -> Self {
        Self {
            db: Arc::new(db),
            billing: Arc::new(billing),
        }
    }

    /// A cloned connection handle for a repository.
    #[must_use]
    pub fn conn(&self) -> DatabaseConnection {
        (*self.db).clone()
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
