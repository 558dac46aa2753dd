//! Item catalog routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use hisaab_db::repositories::{CreateItemInput, ItemFilter, ItemRepository, UpdateItemInput};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::PageQuery;
use crate::validation::{self, double_option};
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiQuery, ValidatedJson},
};

/// Creates the item routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item).patch(update_item).delete(delete_item),
        )
}

/// Query parameters for listing items.
#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    /// Filter by category.
    pub category_id: Option<Uuid>,
    /// Filter by active status.
    pub is_active: Option<bool>,
    /// Only items at or below their reorder level.
    #[serde(default)]
    pub low_stock: bool,
    /// Substring of the name or SKU.
    pub search: Option<String>,
}

/// Request body for creating an item.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateItemRequest {
    /// Item name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Stock keeping unit, unique.
    #[validate(length(min = 1, max = 50))]
    pub sku: String,
    /// Description.
    pub description: Option<String>,
    /// Category.
    pub category_id: Option<Uuid>,
    /// Unit of measure (default: `pcs`).
    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,
    /// HSN classification code.
    #[validate(length(min = 2, max = 8))]
    pub hsn_code: Option<String>,
    /// Selling price.
    #[validate(custom(function = "validation::non_negative"))]
    pub unit_price: Decimal,
    /// Purchase price (default: 0).
    #[validate(custom(function = "validation::non_negative"))]
    pub cost_price: Option<Decimal>,
    /// Opening stock (default: 0).
    #[validate(custom(function = "validation::non_negative"))]
    pub stock_quantity: Option<Decimal>,
    /// Reorder level (default: 0).
    #[validate(custom(function = "validation::non_negative"))]
    pub min_stock_level: Option<Decimal>,
    /// GST rate in percent (default: configured rate).
    #[validate(custom(function = "validation::percent"))]
    pub gst_rate: Option<Decimal>,
    /// Whether the item is sold (default: true).
    pub is_active: Option<bool>,
}

/// Request body for updating an item. Stock moves only with transactions.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateItemRequest {
    /// Item name.
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    /// Stock keeping unit.
    #[validate(length(min = 1, max = 50))]
    pub sku: Option<String>,
    /// Description.
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    /// Category.
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<Uuid>>,
    /// Unit of measure.
    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,
    /// HSN classification code.
    #[serde(default, deserialize_with = "double_option")]
    pub hsn_code: Option<Option<String>>,
    /// Selling price.
    #[validate(custom(function = "validation::non_negative"))]
    pub unit_price: Option<Decimal>,
    /// Purchase price.
    #[validate(custom(function = "validation::non_negative"))]
    pub cost_price: Option<Decimal>,
    /// Reorder level.
    #[validate(custom(function = "validation::non_negative"))]
    pub min_stock_level: Option<Decimal>,
    /// GST rate in percent.
    #[validate(custom(function = "validation::percent"))]
    pub gst_rate: Option<Decimal>,
    /// Whether the item is sold.
    pub is_active: Option<bool>,
}

/// GET `/items` - List items.
async fn list_items(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListItemsQuery>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = ItemFilter {
        category_id: query.category_id,
        is_active: query.is_active,
        low_stock: query.low_stock,
        search: query.search,
    };
    let items = ItemRepository::new(state.conn())
        .list(filter, &page.request())
        .await?;
    Ok(Json(items))
}

/// POST `/items` - Create an item.
async fn create_item(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateItemRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = CreateItemInput {
        name: payload.name,
        sku: payload.sku,
        description: payload.description,
        category_id: payload.category_id,
        unit: payload.unit.unwrap_or_else(|| "pcs".to_string()),
        hsn_code: payload.hsn_code,
        unit_price: payload.unit_price,
        cost_price: payload.cost_price.unwrap_or(Decimal::ZERO),
        stock_quantity: payload.stock_quantity.unwrap_or(Decimal::ZERO),
        min_stock_level: payload.min_stock_level.unwrap_or(Decimal::ZERO),
        gst_rate: payload.gst_rate.unwrap_or(state.billing.default_gst_rate),
        is_active: payload.is_active.unwrap_or(true),
    };

    let item = ItemRepository::new(state.conn()).create(input).await?;
    info!(item_id = %item.id, sku = %item.sku, "Item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET `/items/{id}` - Get an item.
async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(ItemRepository::new(state.conn()).get(id).await?))
}

/// PATCH `/items/{id}` - Update an item.
async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateItemRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = UpdateItemInput {
        name: payload.name,
        sku: payload.sku,
        description: payload.description,
        category_id: payload.category_id,
        unit: payload.unit,
        hsn_code: payload.hsn_code,
        unit_price: payload.unit_price,
        cost_price: payload.cost_price,
        min_stock_level: payload.min_stock_level,
        gst_rate: payload.gst_rate,
        is_active: payload.is_active,
    };

    let item = ItemRepository::new(state.conn()).update(id, input).await?;
    info!(item_id = %id, "Item updated");
    Ok(Json(item))
}

/// DELETE `/items/{id}` - Delete an unreferenced item.
async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    ItemRepository::new(state.conn()).delete(id).await?;
    info!(item_id = %id, "Item deleted");
    Ok(StatusCode::NO_CONTENT)
}
