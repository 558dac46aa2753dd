//! Item repository for the product catalog.

use chrono::Utc;
use hisaab_core::gst::validate_rate;
use hisaab_shared::types::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::error::{RepositoryError, RepositoryResult};
use crate::entities::{categories, invoice_items, items, transaction_items};

/// Input for creating an item.
#[derive(Debug, Clone)]
pub struct CreateItemInput {
    /// Item name.
    pub name: String,
    /// Stock keeping unit, unique.
    pub sku: String,
    /// Description.
    pub description: Option<String>,
    /// Category.
    pub category_id: Option<Uuid>,
    /// Unit of measure.
    pub unit: String,
    /// HSN classification code.
    pub hsn_code: Option<String>,
    /// Selling price.
    pub unit_price: Decimal,
    /// Purchase price.
    pub cost_price: Decimal,
    /// Opening stock.
    pub stock_quantity: Decimal,
    /// Reorder level.
    pub min_stock_level: Decimal,
    /// GST rate in percent.
    pub gst_rate: Decimal,
    /// Whether the item is sold.
    pub is_active: bool,
}

/// Input for updating an item. `None` leaves a field unchanged.
///
/// Stock is not editable here; it only moves with transactions.
#[derive(Debug, Clone, Default)]
pub struct UpdateItemInput {
    /// Item name.
    pub name: Option<String>,
    /// Stock keeping unit.
    pub sku: Option<String>,
    /// Description.
    pub description: Option<Option<String>>,
    /// Category.
    pub category_id: Option<Option<Uuid>>,
    /// Unit of measure.
    pub unit: Option<String>,
    /// HSN classification code.
    pub hsn_code: Option<Option<String>>,
    /// Selling price.
    pub unit_price: Option<Decimal>,
    /// Purchase price.
    pub cost_price: Option<Decimal>,
    /// Reorder level.
    pub min_stock_level: Option<Decimal>,
    /// GST rate in percent.
    pub gst_rate: Option<Decimal>,
    /// Whether the item is sold.
    pub is_active: Option<bool>,
}

/// Filter options for listing items.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    /// Filter by category.
    pub category_id: Option<Uuid>,
    /// Filter by active status.
    pub is_active: Option<bool>,
    /// Only items at or below their reorder level.
    pub low_stock: bool,
    /// Substring of the name or SKU.
    pub search: Option<String>,
}

/// Item repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    db: DatabaseConnection,
}

impl ItemRepository {
    /// Creates a new item repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an item.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` for a taken SKU, `NotFound` for an unknown
    /// category, and a `Gst` error for an invalid rate.
    pub async fn create(&self, input: CreateItemInput) -> RepositoryResult<items::Model> {
        validate_rate(input.gst_rate)?;
        self.ensure_sku_free(&input.sku, None).await?;
        if let Some(category_id) = input.category_id {
            self.ensure_category(category_id).await?;
        }

        let now = Utc::now().into();
        let item = items::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            sku: Set(input.sku),
            description: Set(input.description),
            category_id: Set(input.category_id),
            unit: Set(input.unit),
            hsn_code: Set(input.hsn_code),
            unit_price: Set(input.unit_price),
            cost_price: Set(input.cost_price),
            stock_quantity: Set(input.stock_quantity),
            min_stock_level: Set(input.min_stock_level),
            gst_rate: Set(input.gst_rate),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(item.insert(&self.db).await?)
    }

    /// Gets an item by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item does not exist.
    pub async fn get(&self, id: Uuid) -> RepositoryResult<items::Model> {
        items::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::not_found("Item", id))
    }

    /// Lists items, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: ItemFilter,
        page: &PageRequest,
    ) -> RepositoryResult<PageResponse<items::Model>> {
        let mut query = items::Entity::find().order_by_asc(items::Column::Name);

        if let Some(category_id) = filter.category_id {
            query = query.filter(items::Column::CategoryId.eq(category_id));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(items::Column::IsActive.eq(is_active));
        }
        if filter.low_stock {
            query = query.filter(
                Expr::col(items::Column::StockQuantity).lte(Expr::col(items::Column::MinStockLevel)),
            );
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            let search = search.trim();
            query = query.filter(
                Condition::any()
                    .add(items::Column::Name.contains(search))
                    .add(items::Column::Sku.contains(search)),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(rows, page.page, page.per_page, total))
    }

    /// Updates an item.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item or new category does not exist,
    /// `Conflict` for a taken SKU, and a `Gst` error for an invalid rate.
    pub async fn update(&self, id: Uuid, input: UpdateItemInput) -> RepositoryResult<items::Model> {
        let item = self.get(id).await?;

        if let Some(rate) = input.gst_rate {
            validate_rate(rate)?;
        }
        if let Some(sku) = &input.sku
            && *sku != item.sku
        {
            self.ensure_sku_free(sku, Some(id)).await?;
        }
        if let Some(Some(category_id)) = input.category_id {
            self.ensure_category(category_id).await?;
        }

        let mut active: items::ActiveModel = item.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(sku) = input.sku {
            active.sku = Set(sku);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(unit) = input.unit {
            active.unit = Set(unit);
        }
        if let Some(hsn_code) = input.hsn_code {
            active.hsn_code = Set(hsn_code);
        }
        if let Some(unit_price) = input.unit_price {
            active.unit_price = Set(unit_price);
        }
        if let Some(cost_price) = input.cost_price {
            active.cost_price = Set(cost_price);
        }
        if let Some(min_stock_level) = input.min_stock_level {
            active.min_stock_level = Set(min_stock_level);
        }
        if let Some(gst_rate) = input.gst_rate {
            active.gst_rate = Set(gst_rate);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes an item no transaction or invoice line references.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item does not exist and `Conflict` while
    /// it is referenced.
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;
        items::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Item", id))?;

        let transaction_lines = transaction_items::Entity::find()
            .filter(transaction_items::Column::ItemId.eq(id))
            .count(&txn)
            .await?;
        let invoice_lines = invoice_items::Entity::find()
            .filter(invoice_items::Column::ItemId.eq(id))
            .count(&txn)
            .await?;
        if transaction_lines > 0 || invoice_lines > 0 {
            return Err(RepositoryError::Conflict(format!(
                "Item is used on {transaction_lines} transaction lines and {invoice_lines} invoice lines"
            )));
        }

        items::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn ensure_sku_free(&self, sku: &str, except: Option<Uuid>) -> RepositoryResult<()> {
        let mut query = items::Entity::find().filter(items::Column::Sku.eq(sku));
        if let Some(id) = except {
            query = query.filter(items::Column::Id.ne(id));
        }
        if query.count(&self.db).await? > 0 {
            return Err(RepositoryError::Conflict(format!("SKU {sku} already exists")));
        }
        Ok(())
    }

    async fn ensure_category(&self, category_id: Uuid) -> RepositoryResult<()> {
        categories::Entity::find_by_id(category_id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::not_found("Category", category_id))?;
        Ok(())
    }
}
