//! Point-of-sale checkout.

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use chrono::Utc;
use hisaab_core::invoice::PaymentMethod;
use hisaab_db::repositories::{CheckoutInput, PosRepository};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::transactions::{LineRequest, line_inputs};
use crate::{AppState, error::ApiResult, extractors::ValidatedJson};

/// Creates the POS routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/pos/checkout", post(checkout))
}

/// Request body for a counter sale.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CheckoutRequest {
    /// Buyer; walk-in sales leave it empty.
    pub customer_id: Option<Uuid>,
    /// Basket lines.
    #[validate(length(min = 1), nested)]
    pub lines: Vec<LineRequest>,
    /// How the customer paid.
    pub payment_method: PaymentMethod,
    /// Card or UPI reference.
    #[validate(length(max = 100))]
    pub payment_reference: Option<String>,
    /// Free text.
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// POST `/pos/checkout` - Record a sale, invoice it and take payment at once.
async fn checkout(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CheckoutRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = CheckoutInput {
        customer_id: payload.customer_id,
        lines: line_inputs(payload.lines),
        payment_method: payload.payment_method,
        payment_reference: payload.payment_reference,
        notes: payload.notes,
    };

    let receipt = PosRepository::new(state.conn(), (*state.billing).clone())
        .checkout(input, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
