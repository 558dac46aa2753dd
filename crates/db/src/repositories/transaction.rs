//! Transaction repository for sales and purchases.
//!
//! A transaction is written together with its lines and the stock
//! movements they cause, inside one database transaction.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hisaab_core::billing::{
    BillTotals, BillingService, LineInput, ResolvedLine, SuppliedTotals, TransactionType,
};
use hisaab_core::stock::{StockDirection, apply_movement, is_low_stock};
use hisaab_shared::types::{ItemId, PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use super::error::{RepositoryError, RepositoryResult};
use super::sequence::next_number;
use crate::entities::sea_orm_active_enums::TransactionType as DbTransactionType;
use crate::entities::{invoices, items, parties, transaction_items, transactions};

/// Input for recording a sale or purchase.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// Sale or purchase.
    pub transaction_type: TransactionType,
    /// Buyer, for sales.
    pub customer_id: Option<Uuid>,
    /// Seller, for purchases.
    pub supplier_id: Option<Uuid>,
    /// Defaults to now.
    pub transaction_date: Option<DateTime<Utc>>,
    /// Free text.
    pub notes: Option<String>,
    /// Lines, at least one.
    pub lines: Vec<LineInput>,
    /// Aggregates claimed by the caller, checked against the lines.
    pub supplied: SuppliedTotals,
}

/// A transaction with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionWithItems {
    /// The header.
    #[serde(flatten)]
    pub transaction: transactions::Model,
    /// The lines, in entry order.
    pub items: Vec<transaction_items::Model>,
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by type.
    pub transaction_type: Option<TransactionType>,
    /// Transactions where this party is customer or supplier.
    pub party_id: Option<Uuid>,
}

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a transaction, its lines and the stock it moves.
    ///
    /// # Errors
    ///
    /// Returns a `Billing` error for invalid lines or mismatching totals,
    /// `NotFound` for an unknown party or item, and a `Stock` error when a
    /// sale exceeds stock on hand. Nothing is written on error.
    pub async fn create(
        &self,
        input: CreateTransactionInput,
    ) -> RepositoryResult<TransactionWithItems> {
        let bill = resolve_bill(&input)?;

        let txn = self.db.begin().await?;
        let created = create_in(&txn, &input, bill).await?;
        txn.commit().await?;

        tracing::info!(
            transaction_id = %created.transaction.id,
            transaction_number = %created.transaction.transaction_number,
            total = %created.transaction.total_amount,
            "Transaction recorded"
        );
        Ok(created)
    }

    /// Gets a transaction with its lines.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the transaction does not exist.
    pub async fn get(&self, id: Uuid) -> RepositoryResult<TransactionWithItems> {
        get_in(&self.db, id).await
    }

    /// Lists transaction headers, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: TransactionFilter,
        page: &PageRequest,
    ) -> RepositoryResult<PageResponse<transactions::Model>> {
        let mut query = transactions::Entity::find()
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::TransactionNumber);

        if let Some(kind) = filter.transaction_type {
            query = query
                .filter(transactions::Column::TransactionType.eq(DbTransactionType::from(kind)));
        }
        if let Some(party_id) = filter.party_id {
            query = query.filter(
                Condition::any()
                    .add(transactions::Column::CustomerId.eq(party_id))
                    .add(transactions::Column::SupplierId.eq(party_id)),
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

    /// Deletes an uninvoiced transaction and reverses its stock movements.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the transaction does not exist, `Conflict` if
    /// it has been invoiced, and a `Stock` error if reversing a purchase
    /// would take stock below zero.
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;
        let existing = get_in(&txn, id).await?;

        let invoiced = invoices::Entity::find()
            .filter(invoices::Column::TransactionId.eq(id))
            .count(&txn)
            .await?;
        if invoiced > 0 {
            return Err(RepositoryError::Conflict(format!(
                "Transaction {} has been invoiced",
                existing.transaction.transaction_number
            )));
        }

        let direction =
            StockDirection::from(TransactionType::from(existing.transaction.transaction_type))
                .reversed();
        let movements = stock_movements(existing.items.iter().map(|l| (l.item_id, l.quantity)));
        for (item_id, quantity) in movements {
            move_stock(&txn, item_id, direction, quantity).await?;
        }

        transaction_items::Entity::delete_many()
            .filter(transaction_items::Column::TransactionId.eq(id))
            .exec(&txn)
            .await?;
        transactions::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(transaction_id = %id, "Transaction deleted, stock reversed");
        Ok(())
    }
}

/// Resolves the lines of `input` and checks any supplied aggregates.
///
/// Runs before a database transaction is opened.
pub(crate) fn resolve_bill(
    input: &CreateTransactionInput,
) -> RepositoryResult<(Vec<ResolvedLine>, BillTotals)> {
    let (lines, totals) = BillingService::resolve_lines(&input.lines)?;
    BillingService::verify_supplied(&totals, &input.supplied)?;
    Ok((lines, totals))
}

/// Writes a transaction with its resolved bill on an open connection or
/// database transaction.
///
/// The caller owns the commit; used directly by the point-of-sale checkout.
pub(crate) async fn create_in<C: ConnectionTrait>(
    db: &C,
    input: &CreateTransactionInput,
    (lines, totals): (Vec<ResolvedLine>, BillTotals),
) -> RepositoryResult<TransactionWithItems> {
    for party_id in [input.customer_id, input.supplier_id].into_iter().flatten() {
        parties::Entity::find_by_id(party_id)
            .one(db)
            .await?
            .ok_or(RepositoryError::not_found("Party", party_id))?;
    }

    let date = input.transaction_date.unwrap_or_else(Utc::now);
    let number = next_number::<transactions::Entity, _>(
        db,
        transactions::Column::TransactionNumber,
        input.transaction_type.number_prefix(),
        date,
    )
    .await?;

    let now = Utc::now().into();
    let transaction_id = Uuid::now_v7();
    let transaction = transactions::ActiveModel {
        id: Set(transaction_id),
        transaction_number: Set(number),
        transaction_type: Set(input.transaction_type.into()),
        customer_id: Set(input.customer_id),
        supplier_id: Set(input.supplier_id),
        transaction_date: Set(date.into()),
        subtotal: Set(totals.subtotal),
        tax_amount: Set(totals.tax_amount),
        discount_amount: Set(totals.discount_amount),
        total_amount: Set(totals.total_amount),
        notes: Set(input.notes.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    let direction = StockDirection::from(input.transaction_type);
    let movements = stock_movements(lines.iter().map(|l| (l.item_id.into_inner(), l.quantity)));
    for (item_id, quantity) in movements {
        move_stock(db, item_id, direction, quantity).await?;
    }

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let item_id = line.item_id.into_inner();
        let row = transaction_items::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_id: Set(transaction_id),
            item_id: Set(item_id),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            discount: Set(line.discount),
            tax_rate: Set(line.tax_rate),
            tax_amount: Set(line.tax_amount),
            line_total: Set(line.line_total),
            created_at: Set(now),
        }
        .insert(db)
        .await?;
        items.push(row);
    }

    Ok(TransactionWithItems { transaction, items })
}

/// Net quantity per item, ordered by item id.
///
/// Item rows are locked in this order so concurrent bills touching the same
/// items cannot deadlock.
fn stock_movements(lines: impl Iterator<Item = (Uuid, Decimal)>) -> BTreeMap<Uuid, Decimal> {
    let mut movements = BTreeMap::new();
    for (item_id, quantity) in lines {
        *movements.entry(item_id).or_insert(Decimal::ZERO) += quantity;
    }
    movements
}

/// Loads a transaction and its lines.
pub(crate) async fn get_in<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> RepositoryResult<TransactionWithItems> {
    let transaction = transactions::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(RepositoryError::not_found("Transaction", id))?;
    let items = transaction_items::Entity::find()
        .filter(transaction_items::Column::TransactionId.eq(id))
        .order_by_asc(transaction_items::Column::CreatedAt)
        .order_by_asc(transaction_items::Column::Id)
        .all(db)
        .await?;

    Ok(TransactionWithItems { transaction, items })
}

/// Moves stock of one item, locking its row for the rest of the transaction.
async fn move_stock<C: ConnectionTrait>(
    db: &C,
    item_id: Uuid,
    direction: StockDirection,
    quantity: Decimal,
) -> RepositoryResult<()> {
    let item = items::Entity::find_by_id(item_id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or(RepositoryError::not_found("Item", item_id))?;

    let on_hand = apply_movement(
        ItemId::from_uuid(item_id),
        item.stock_quantity,
        direction,
        quantity,
    )?;
    if is_low_stock(on_hand, item.min_stock_level) {
        tracing::warn!(
            item_id = %item_id,
            sku = %item.sku,
            on_hand = %on_hand,
            min_stock_level = %item.min_stock_level,
            "Item at or below minimum stock level"
        );
    }

    let mut active: items::ActiveModel = item.into();
    active.stock_quantity = Set(on_hand);
    active.updated_at = Set(Utc::now().into());
    active.update(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_stock_movements_are_sorted_and_merged() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let c = Uuid::from_u128(3);

        let movements = stock_movements(
            [(c, dec!(1)), (a, dec!(2)), (c, dec!(4)), (b, dec!(0.5))].into_iter(),
        );

        assert_eq!(
            movements.into_iter().collect::<Vec<_>>(),
            vec![(a, dec!(2)), (b, dec!(0.5)), (c, dec!(5))]
        );
    }
}
