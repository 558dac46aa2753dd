//! Sale and purchase transaction routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use hisaab_core::billing::{LineInput, SuppliedTotals, TransactionType};
use hisaab_db::repositories::{
    CreateTransactionInput, InvoiceOptions, InvoiceRepository, TransactionFilter,
    TransactionRepository,
};
use hisaab_shared::types::ItemId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::PageQuery;
use crate::validation;
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiQuery, ValidatedJson},
};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/transactions/{id}",
            get(get_transaction).delete(delete_transaction),
        )
        .route("/transactions/{id}/invoice", post(invoice_transaction))
}

/// One line of a bill as sent by a client.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LineRequest {
    /// Item sold or bought.
    pub item_id: Uuid,
    /// Quantity, up to three decimal places.
    #[validate(custom(function = "validation::positive"))]
    pub quantity: Decimal,
    /// Price per unit.
    #[validate(custom(function = "validation::non_negative"))]
    pub unit_price: Decimal,
    /// Flat discount on the line.
    #[serde(default)]
    #[validate(custom(function = "validation::non_negative"))]
    pub discount: Decimal,
    /// GST rate in percent.
    #[validate(custom(function = "validation::percent"))]
    pub tax_rate: Decimal,
}

impl From<LineRequest> for LineInput {
    fn from(line: LineRequest) -> Self {
        Self {
            item_id: ItemId::from_uuid(line.item_id),
            quantity: line.quantity,
            unit_price: line.unit_price,
            discount: line.discount,
            tax_rate: line.tax_rate,
        }
    }
}

/// Converts request lines into billing inputs.
pub(crate) fn line_inputs(lines: Vec<LineRequest>) -> Vec<LineInput> {
    lines.into_iter().map(LineInput::from).collect()
}

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// SALE or PURCHASE.
    pub transaction_type: Option<TransactionType>,
    /// Customer or supplier on the transaction.
    pub party_id: Option<Uuid>,
}

/// Request body for recording a transaction.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateTransactionRequest {
    /// SALE or PURCHASE.
    pub transaction_type: TransactionType,
    /// Buyer on a sale.
    pub customer_id: Option<Uuid>,
    /// Seller on a purchase.
    pub supplier_id: Option<Uuid>,
    /// Business date (default: now).
    pub transaction_date: Option<DateTime<Utc>>,
    /// Free text.
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    /// Bill lines.
    #[validate(length(min = 1), nested)]
    pub lines: Vec<LineRequest>,
    /// Aggregates the client computed; rejected if they disagree.
    #[serde(default)]
    pub totals: SuppliedTotals,
}

/// Request body for invoicing a transaction. Every field is optional.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct InvoiceTransactionRequest {
    /// Issue date (default: now).
    pub issue_date: Option<DateTime<Utc>>,
    /// Overrides the party's payment terms.
    #[validate(range(max = 365))]
    pub payment_terms_days: Option<u32>,
    /// Free text printed on the invoice.
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// GET `/transactions` - List transactions, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListTransactionsQuery>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = TransactionFilter {
        transaction_type: query.transaction_type,
        party_id: query.party_id,
    };
    let transactions = TransactionRepository::new(state.conn())
        .list(filter, &page.request())
        .await?;
    Ok(Json(transactions))
}

/// POST `/transactions` - Record a sale or purchase and move stock.
async fn create_transaction(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateTransactionRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = CreateTransactionInput {
        transaction_type: payload.transaction_type,
        customer_id: payload.customer_id,
        supplier_id: payload.supplier_id,
        transaction_date: payload.transaction_date,
        notes: payload.notes,
        lines: line_inputs(payload.lines),
        supplied: payload.totals,
    };

    let created = TransactionRepository::new(state.conn())
        .create(input)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET `/transactions/{id}` - Get a transaction with its lines.
async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(TransactionRepository::new(state.conn()).get(id).await?))
}

/// DELETE `/transactions/{id}` - Delete an uninvoiced transaction and reverse its stock.
async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    TransactionRepository::new(state.conn()).delete(id).await?;
    info!(transaction_id = %id, "Transaction deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/transactions/{id}/invoice` - Issue the invoice for a transaction.
async fn invoice_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<InvoiceTransactionRequest>,
) -> ApiResult<impl IntoResponse> {
    let options = InvoiceOptions {
        issue_date: payload.issue_date,
        payment_terms_days: payload.payment_terms_days,
        notes: payload.notes,
    };

    let invoice = InvoiceRepository::new(state.conn(), (*state.billing).clone())
        .create_from_transaction(id, options)
        .await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}
