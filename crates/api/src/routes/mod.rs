//! API route definitions.

use axum::Router;
use hisaab_shared::types::PageRequest;
use serde::Deserialize;

use crate::AppState;

pub mod categories;
pub mod dashboard;
pub mod gst;
pub mod health;
pub mod invoices;
pub mod items;
pub mod parties;
pub mod pos;
pub mod transactions;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(gst::routes())
        .merge(parties::routes())
        .merge(categories::routes())
        .merge(items::routes())
        .merge(transactions::routes())
        .merge(invoices::routes())
        .merge(pos::routes())
        .merge(dashboard::routes())
}

/// Page parameters accepted by every list endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    /// Page number (1-indexed, default: 1).
    pub page: Option<u32>,
    /// Items per page (default: 20, max: 100).
    pub per_page: Option<u32>,
}

impl PageQuery {
    /// The normalized page request.
    #[must_use]
    pub fn request(self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
        .normalized()
    }
}
