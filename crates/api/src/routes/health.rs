//! Health check endpoint.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the database does not answer.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Whether the database answered a ping.
    pub database: bool,
}

/// GET `/health` - Liveness, with a database ping.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            false
        }
    };

    Json(HealthResponse {
        status: if database { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
