//! Category routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use hisaab_db::repositories::{CategoryRepository, CreateCategoryInput, UpdateCategoryInput};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::PageQuery;
use crate::validation::double_option;
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiQuery, ValidatedJson},
};

/// Creates the category routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
}

/// Query parameters for listing categories.
#[derive(Debug, Deserialize)]
pub struct ListCategoriesQuery {
    /// Only children of this category.
    pub parent_id: Option<Uuid>,
}

/// Request body for creating a category.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateCategoryRequest {
    /// Category name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Parent category.
    pub parent_id: Option<Uuid>,
}

/// Request body for updating a category. `parent_id: null` makes it a root.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateCategoryRequest {
    /// Category name.
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// Description.
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    /// Parent category.
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<Uuid>>,
}

/// GET `/categories` - List categories.
async fn list_categories(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListCategoriesQuery>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let categories = CategoryRepository::new(state.conn())
        .list(query.parent_id, &page.request())
        .await?;
    Ok(Json(categories))
}

/// POST `/categories` - Create a category.
async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    let category = CategoryRepository::new(state.conn())
        .create(CreateCategoryInput {
            name: payload.name,
            description: payload.description,
            parent_id: payload.parent_id,
        })
        .await?;
    info!(category_id = %category.id, parent_id = ?category.parent_id, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET `/categories/{id}` - Get a category.
async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(CategoryRepository::new(state.conn()).get(id).await?))
}

/// PATCH `/categories/{id}` - Rename or move a category.
async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    let category = CategoryRepository::new(state.conn())
        .update(
            id,
            UpdateCategoryInput {
                name: payload.name,
                description: payload.description,
                parent_id: payload.parent_id,
            },
        )
        .await?;
    info!(category_id = %id, "Category updated");
    Ok(Json(category))
}

/// DELETE `/categories/{id}` - Delete an empty category.
async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    CategoryRepository::new(state.conn()).delete(id).await?;
    info!(category_id = %id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
