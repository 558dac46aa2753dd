//! GST calculator endpoint.

use axum::{Json, Router, extract::State, routing::post};
use hisaab_core::gst::{GstBreakdown, compute_gst, is_inter_state};
use hisaab_shared::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{AppState, error::ApiResult, extractors::ValidatedJson, validation};

/// Request body for a GST calculation.
///
/// Inter-state supply is taken from `is_inter_state` when given, otherwise
/// from comparing `place_of_supply` with the seller's state.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CalculateGstRequest {
    /// Taxable amount.
    #[validate(custom(function = "validation::non_negative"))]
    pub amount: Decimal,
    /// GST rate in percent.
    #[validate(custom(function = "validation::percent"))]
    pub rate: Decimal,
    /// Explicit inter-state flag.
    pub is_inter_state: Option<bool>,
    /// Buyer's state.
    #[validate(length(min = 1, max = 100))]
    pub place_of_supply: Option<String>,
}

/// GST calculation result.
#[derive(Debug, Serialize)]
pub struct CalculateGstResponse {
    /// Unrounded breakdown.
    #[serde(flatten)]
    pub breakdown: GstBreakdown,
    /// Breakdown rounded to paise.
    pub rounded: GstBreakdown,
    /// Whether IGST applied.
    pub is_inter_state: bool,
    /// Display label, e.g. `CGST 90.00 + SGST 90.00` or `GST Exempt`.
    pub label: String,
}

/// POST `/gst/calculate` - Split GST into CGST/SGST or IGST.
async fn calculate(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CalculateGstRequest>,
) -> ApiResult<Json<CalculateGstResponse>> {
    let inter_state = payload.is_inter_state.unwrap_or_else(|| {
        payload
            .place_of_supply
            .as_deref()
            .is_some_and(|state_name| is_inter_state(state_name, &state.billing.seller_state))
    });

    let breakdown =
        compute_gst(payload.amount, payload.rate, inter_state).map_err(AppError::from)?;
    let rounded = breakdown.rounded();

    Ok(Json(CalculateGstResponse {
        breakdown,
        rounded,
        is_inter_state: inter_state,
        label: rounded.label(),
    }))
}

/// Creates GST routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/gst/calculate", post(calculate))
}
