//! Category repository.
//!
//! Every write to the tree runs in one database transaction that first
//! takes the `TREE_LOCK`, so the parent map a write validates against cannot
//! change before it commits.

use std::collections::HashMap;

use chrono::Utc;
use hisaab_core::category::{ensure_deletable, validate_parent};
use hisaab_shared::types::{CategoryId, PageRequest, PageResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::error::{RepositoryError, RepositoryResult};
use crate::entities::{categories, items};

/// Serializes tree writers against each other while leaving reads free.
///
/// `SHARE ROW EXCLUSIVE` conflicts with itself and with row writes, but not
/// with plain `SELECT`s.
const TREE_LOCK: &str = "LOCK TABLE categories IN SHARE ROW EXCLUSIVE MODE";

/// Input for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    /// Category name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Parent category.
    pub parent_id: Option<Uuid>,
}

/// Input for updating a category. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryInput {
    /// Category name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<Option<String>>,
    /// Parent category; `Some(None)` makes it a root.
    pub parent_id: Option<Option<Uuid>>,
}

/// Category repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
}

impl CategoryRepository {
    /// Creates a new category repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a category under an existing parent.
    ///
    /// # Errors
    ///
    /// Returns a `Category` error if the parent does not exist.
    pub async fn create(&self, input: CreateCategoryInput) -> RepositoryResult<categories::Model> {
        let id = Uuid::now_v7();
        let txn = self.begin_tree_write().await?;
        let parents = parent_map(&txn).await?;
        validate_parent(
            CategoryId::from_uuid(id),
            input.parent_id.map(CategoryId::from_uuid),
            &parents,
        )?;

        let now = Utc::now().into();
        let category = categories::ActiveModel {
            id: Set(id),
            name: Set(input.name),
            description: Set(input.description),
            parent_id: Set(input.parent_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let category = category.insert(&txn).await?;
        txn.commit().await?;
        Ok(category)
    }

    /// Gets a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category does not exist.
    pub async fn get(&self, id: Uuid) -> RepositoryResult<categories::Model> {
        categories::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::not_found("Category", id))
    }

    /// Lists categories, optionally only the children of `parent_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        parent_id: Option<Uuid>,
        page: &PageRequest,
    ) -> RepositoryResult<PageResponse<categories::Model>> {
        let mut query = categories::Entity::find().order_by_asc(categories::Column::Name);
        if let Some(parent_id) = parent_id {
            query = query.filter(categories::Column::ParentId.eq(parent_id));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(rows, page.page, page.per_page, total))
    }

    /// Updates a category, rejecting parents that would form a cycle.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category does not exist and a `Category`
    /// error if the new parent is invalid.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> RepositoryResult<categories::Model> {
        let txn = self.begin_tree_write().await?;
        let category = categories::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Category", id))?;

        if let Some(parent_id) = input.parent_id {
            let parents = parent_map(&txn).await?;
            validate_parent(
                CategoryId::from_uuid(id),
                parent_id.map(CategoryId::from_uuid),
                &parents,
            )?;
        }

        let mut active: categories::ActiveModel = category.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(parent_id) = input.parent_id {
            active.parent_id = Set(parent_id);
        }
        active.updated_at = Set(Utc::now().into());

        let category = active.update(&txn).await?;
        txn.commit().await?;
        Ok(category)
    }

    /// Deletes a category with no children and no items.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the category does not exist and a `Category`
    /// error while it is in use.
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let txn = self.begin_tree_write().await?;
        categories::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Category", id))?;

        let children = categories::Entity::find()
            .filter(categories::Column::ParentId.eq(id))
            .count(&txn)
            .await?;
        let item_count = items::Entity::find()
            .filter(items::Column::CategoryId.eq(id))
            .count(&txn)
            .await?;
        ensure_deletable(children, item_count)?;

        categories::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Opens a transaction holding the tree lock until commit or rollback.
    async fn begin_tree_write(&self) -> RepositoryResult<DatabaseTransaction> {
        let txn = self.db.begin().await?;
        txn.execute_unprepared(TREE_LOCK).await?;
        Ok(txn)
    }
}

/// Loads every category's parent for tree checks.
async fn parent_map<C: ConnectionTrait>(
    db: &C,
) -> RepositoryResult<HashMap<CategoryId, Option<CategoryId>>> {
    let rows: Vec<(Uuid, Option<Uuid>)> = categories::Entity::find()
        .select_only()
        .column(categories::Column::Id)
        .column(categories::Column::ParentId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, parent)| {
            (
                CategoryId::from_uuid(id),
                parent.map(CategoryId::from_uuid),
            )
        })
        .collect())
}
