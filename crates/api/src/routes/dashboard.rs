//! Dashboard routes.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use chrono::Utc;
use hisaab_db::repositories::DashboardRepository;

use crate::{AppState, error::ApiResult};

/// Creates the dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

/// GET `/dashboard` - Sales, purchases, receivables and counts.
async fn get_dashboard(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let summary = DashboardRepository::new(state.conn())
        .summary(Utc::now())
        .await?;
    Ok(Json(summary))
}
