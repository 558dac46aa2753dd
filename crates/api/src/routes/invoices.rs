//! Invoice and payment routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, put},
};
use chrono::{DateTime, Utc};
use hisaab_core::billing::SuppliedTotals;
use hisaab_core::invoice::{InvoiceStatus, PaymentDetails, PaymentMethod};
use hisaab_db::repositories::{
    CreateInvoiceInput, InvoiceFilter, InvoiceOptions, InvoiceRepository,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::PageQuery;
use super::transactions::{LineRequest, line_inputs};
use crate::validation;
use crate::{
    ApiError, AppState,
    error::ApiResult,
    extractors::{ApiQuery, ValidatedJson},
};

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route(
            "/invoices/{id}",
            get(get_invoice).delete(delete_invoice),
        )
        .route("/invoices/{id}/items", put(replace_items))
        .route("/invoices/{id}/status", patch(update_status))
        .route("/invoices/{id}/payments", get(list_payments))
}

/// Query parameters for listing invoices.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    /// Status, case-insensitive.
    pub status: Option<String>,
    /// Billed party.
    pub party_id: Option<Uuid>,
}

/// Request body for building an invoice directly from lines.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateInvoiceRequest {
    /// Billed party.
    pub party_id: Option<Uuid>,
    /// Invoice lines.
    #[validate(length(min = 1), nested)]
    pub lines: Vec<LineRequest>,
    /// Aggregates the client computed; rejected if they disagree.
    #[serde(default)]
    pub totals: SuppliedTotals,
    /// Issue date (default: now).
    pub issue_date: Option<DateTime<Utc>>,
    /// Overrides the party's payment terms.
    #[validate(range(max = 365))]
    pub payment_terms_days: Option<u32>,
    /// Free text printed on the invoice.
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Request body for replacing the lines of a draft invoice.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ReplaceItemsRequest {
    /// New invoice lines.
    #[validate(length(min = 1), nested)]
    pub lines: Vec<LineRequest>,
    /// Aggregates the client computed; rejected if they disagree.
    #[serde(default)]
    pub totals: SuppliedTotals,
}

/// Payment recorded when an invoice is marked paid.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PaymentRequest {
    /// Amount received (default: the invoice total).
    #[validate(custom(function = "validation::positive"))]
    pub amount: Option<Decimal>,
    /// How the payment was made.
    pub method: PaymentMethod,
    /// Bank or UPI reference.
    #[validate(length(max = 100))]
    pub reference: Option<String>,
}

/// Request body for a status change.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusRequest {
    /// Requested status, case-insensitive.
    #[validate(length(min = 1))]
    pub status: String,
    /// Required when the requested status is PAID.
    #[validate(nested)]
    pub payment: Option<PaymentRequest>,
}

/// GET `/invoices` - List invoices, newest first.
async fn list_invoices(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListInvoicesQuery>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<InvoiceStatus>)
        .transpose()
        .map_err(|e| ApiError(e.into()))?;

    let filter = InvoiceFilter {
        status,
        party_id: query.party_id,
    };
    let invoices = repository(&state).list(filter, &page.request()).await?;
    Ok(Json(invoices))
}

/// POST `/invoices` - Build a draft invoice from lines.
async fn create_invoice(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateInvoiceRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = CreateInvoiceInput {
        party_id: payload.party_id,
        lines: line_inputs(payload.lines),
        supplied: payload.totals,
        options: InvoiceOptions {
            issue_date: payload.issue_date,
            payment_terms_days: payload.payment_terms_days,
            notes: payload.notes,
        },
    };

    let created = repository(&state).create(input).await?;
    info!(
        invoice_id = %created.invoice.id,
        invoice_number = %created.invoice.invoice_number,
        "Invoice created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET `/invoices/{id}` - Get an invoice with its lines and payments.
async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(repository(&state).get(id).await?))
}

/// DELETE `/invoices/{id}` - Delete a draft invoice.
async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    repository(&state).delete(id).await?;
    info!(invoice_id = %id, "Invoice deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT `/invoices/{id}/items` - Replace the lines of a draft invoice.
async fn replace_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ReplaceItemsRequest>,
) -> ApiResult<impl IntoResponse> {
    let updated = repository(&state)
        .replace_items(id, line_inputs(payload.lines), payload.totals)
        .await?;
    info!(invoice_id = %id, total = %updated.invoice.total_amount, "Invoice items replaced");
    Ok(Json(updated))
}

/// PATCH `/invoices/{id}/status` - Move an invoice through its lifecycle.
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let payment = payload.payment.map(|p| PaymentDetails {
        amount: p.amount,
        method: p.method,
        reference: p.reference,
    });

    let change = repository(&state)
        .update_status(id, &payload.status, payment, Utc::now())
        .await?;
    Ok(Json(change))
}

/// GET `/invoices/{id}/payments` - List payments against an invoice.
async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(repository(&state).list_payments(id).await?))
}

fn repository(state: &AppState) -> InvoiceRepository {
    InvoiceRepository::new(state.conn(), (*state.billing).clone())
}
