//! Dashboard repository for summary figures.

use chrono::{DateTime, Utc};
use hisaab_core::dashboard::{DashboardSummary, InvoiceStatusCounts, month_start};
use hisaab_core::invoice::InvoiceStatus;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Select,
};

use super::error::RepositoryResult;
use crate::entities::sea_orm_active_enums::{
    InvoiceStatus as DbInvoiceStatus, PartyType, PaymentStatus, TransactionType,
};
use crate::entities::{invoices, items, parties, payments, transactions};

/// Dashboard repository.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    db: DatabaseConnection,
}

impl DashboardRepository {
    /// Creates a new dashboard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Computes the dashboard summary as of `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn summary(&self, now: DateTime<Utc>) -> RepositoryResult<DashboardSummary> {
        let total_sales = self
            .sum(
                transactions::Entity::find()
                    .filter(transactions::Column::TransactionType.eq(TransactionType::Sale)),
                transactions::Column::TotalAmount,
            )
            .await?;
        let total_purchases = self
            .sum(
                transactions::Entity::find()
                    .filter(transactions::Column::TransactionType.eq(TransactionType::Purchase)),
                transactions::Column::TotalAmount,
            )
            .await?;
        let receivables = self
            .sum(
                invoices::Entity::find().filter(
                    invoices::Column::Status.is_in(
                        InvoiceStatus::ALL
                            .into_iter()
                            .filter(InvoiceStatus::is_receivable)
                            .map(DbInvoiceStatus::from),
                    ),
                ),
                invoices::Column::BalanceAmount,
            )
            .await?;
        let payments_this_month = self
            .sum(
                payments::Entity::find()
                    .filter(payments::Column::Status.eq(PaymentStatus::Completed))
                    .filter(payments::Column::PaymentDate.gte(month_start(now)))
                    .filter(payments::Column::PaymentDate.lte(now)),
                payments::Column::Amount,
            )
            .await?;

        let active_customers = parties::Entity::find()
            .filter(parties::Column::IsActive.eq(true))
            .filter(parties::Column::PartyType.eq(PartyType::Customer))
            .count(&self.db)
            .await?;
        let active_suppliers = parties::Entity::find()
            .filter(parties::Column::IsActive.eq(true))
            .filter(parties::Column::PartyType.is_in([PartyType::Supplier, PartyType::Vendor]))
            .count(&self.db)
            .await?;
        let low_stock_items = items::Entity::find()
            .filter(items::Column::IsActive.eq(true))
            .filter(
                Expr::col(items::Column::StockQuantity).lte(Expr::col(items::Column::MinStockLevel)),
            )
            .count(&self.db)
            .await?;

        Ok(DashboardSummary {
            total_sales,
            total_purchases,
            receivables,
            invoice_counts: self.invoice_counts().await?,
            active_customers,
            active_suppliers,
            low_stock_items,
            payments_this_month,
        })
    }

    async fn invoice_counts(&self) -> RepositoryResult<InvoiceStatusCounts> {
        let rows: Vec<(DbInvoiceStatus, i64)> = invoices::Entity::find()
            .select_only()
            .column(invoices::Column::Status)
            .column_as(invoices::Column::Id.count(), "count")
            .group_by(invoices::Column::Status)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut counts = InvoiceStatusCounts::default();
        for (status, count) in rows {
            counts.record(InvoiceStatus::from(status), u64::try_from(count).unwrap_or(0));
        }
        Ok(counts)
    }

    async fn sum<E: EntityTrait>(
        &self,
        query: Select<E>,
        column: E::Column,
    ) -> RepositoryResult<Decimal> {
        let total = query
            .select_only()
            .column_as(column.sum(), "total")
            .into_tuple::<Option<Decimal>>()
            .one(&self.db)
            .await?
            .flatten();
        Ok(total.unwrap_or(Decimal::ZERO))
    }
}
