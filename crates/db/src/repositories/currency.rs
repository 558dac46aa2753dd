//! Currency migration repository.
//!
//! Rewrites every stored amount by the plan's rate in a single database
//! transaction. Running it twice converts twice.

use hisaab_core::migration::{MigrationPlan, MigrationReport};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    TransactionTrait, UpdateMany,
};

use super::error::RepositoryResult;
use crate::entities::{
    invoice_items, invoices, items, parties, payments, transaction_items, transactions,
};

/// Repository for the one-shot currency migration.
#[derive(Debug, Clone)]
pub struct CurrencyMigrationRepository {
    db: DatabaseConnection,
}

impl CurrencyMigrationRepository {
    /// Creates a new currency migration repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Converts every money column and normalises legacy party and item data.
    ///
    /// Commits fully or not at all.
    ///
    /// # Errors
    ///
    /// Returns a database error if any update fails; nothing is written then.
    pub async fn migrate_amounts(&self, plan: &MigrationPlan) -> RepositoryResult<MigrationReport> {
        let rate = plan.rate();
        tracing::info!(
            %rate,
            from = %plan.from_currency(),
            to = %plan.to_currency(),
            "Starting currency migration"
        );

        let txn = self.db.begin().await?;
        let report = migrate_in(&txn, plan).await?;
        txn.commit().await?;

        tracing::info!(
            converted_rows = report.converted_rows(),
            party_countries = report.party_countries,
            item_gst_rates = report.item_gst_rates,
            "Currency migration committed"
        );
        Ok(report)
    }
}

/// Applies `plan` on an open database transaction; the caller commits.
///
/// # Errors
///
/// Returns the first failing update.
pub async fn migrate_in<C: ConnectionTrait>(
    db: &C,
    plan: &MigrationPlan,
) -> Result<MigrationReport, DbErr> {
    let rate = plan.rate();
    Ok(MigrationReport {
        parties: rows(db, scale::<parties::Entity>(&[parties::Column::CreditLimit], rate)).await?,
        party_countries: rows(db, normalize_countries(plan)).await?,
        items: rows(
            db,
            scale::<items::Entity>(&[items::Column::UnitPrice, items::Column::CostPrice], rate),
        )
        .await?,
        item_gst_rates: rows(db, backfill_gst_rates(plan)).await?,
        transactions: rows(
            db,
            scale::<transactions::Entity>(
                &[
                    transactions::Column::Subtotal,
                    transactions::Column::TaxAmount,
                    transactions::Column::DiscountAmount,
                    transactions::Column::TotalAmount,
                ],
                rate,
            ),
        )
        .await?,
        transaction_items: rows(
            db,
            scale::<transaction_items::Entity>(
                &[
                    transaction_items::Column::UnitPrice,
                    transaction_items::Column::Discount,
                    transaction_items::Column::TaxAmount,
                    transaction_items::Column::LineTotal,
                ],
                rate,
            ),
        )
        .await?,
        invoices: rows(
            db,
            scale::<invoices::Entity>(
                &[
                    invoices::Column::Subtotal,
                    invoices::Column::TaxAmount,
                    invoices::Column::CgstAmount,
                    invoices::Column::SgstAmount,
                    invoices::Column::IgstAmount,
                    invoices::Column::DiscountAmount,
                    invoices::Column::TotalAmount,
                    invoices::Column::PaidAmount,
                    invoices::Column::BalanceAmount,
                ],
                rate,
            ),
        )
        .await?,
        invoice_items: rows(
            db,
            scale::<invoice_items::Entity>(
                &[
                    invoice_items::Column::UnitPrice,
                    invoice_items::Column::Discount,
                    invoice_items::Column::TaxAmount,
                    invoice_items::Column::LineTotal,
                ],
                rate,
            ),
        )
        .await?,
        payments: rows(db, scale::<payments::Entity>(&[payments::Column::Amount], rate)).await?,
    })
}

async fn rows<E, C>(db: &C, update: UpdateMany<E>) -> Result<u64, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    Ok(update.exec(db).await?.rows_affected)
}

/// Multiplies `columns` of every row of `E` by `rate`.
///
/// `NUMERIC(14,2)` assignment rounds half away from zero, as `round_money` does.
fn scale<E: EntityTrait>(columns: &[E::Column], rate: Decimal) -> UpdateMany<E> {
    columns.iter().fold(E::update_many(), |update, &column| {
        update.col_expr(column, Expr::col(column).mul(rate))
    })
}

/// Replaces blank and US country spellings with the plan's default country.
fn normalize_countries(plan: &MigrationPlan) -> UpdateMany<parties::Entity> {
    parties::Entity::update_many()
        .col_expr(
            parties::Column::Country,
            Expr::value(plan.default_country().to_string()),
        )
        .filter(
            Condition::any()
                .add(parties::Column::Country.is_null())
                .add(
                    Expr::expr(Expr::cust("LOWER(TRIM(country))"))
                        .is_in(plan.replaced_countries()),
                ),
        )
}

/// Writes the plan's default GST rate over zero rates.
fn backfill_gst_rates(plan: &MigrationPlan) -> UpdateMany<items::Entity> {
    items::Entity::update_many()
        .col_expr(items::Column::GstRate, Expr::value(plan.default_gst_rate()))
        .filter(items::Column::GstRate.eq(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DbBackend, QueryTrait};

    fn plan() -> MigrationPlan {
        MigrationPlan::new(dec!(83), "India", dec!(18)).unwrap()
    }

    fn sql<E: EntityTrait>(update: UpdateMany<E>) -> String {
        update.build(DbBackend::Postgres).to_string()
    }

    #[test]
    fn test_scale_multiplies_every_column() {
        let sql = sql(scale::<items::Entity>(
            &[items::Column::UnitPrice, items::Column::CostPrice],
            dec!(83),
        ));
        assert!(sql.starts_with(r#"UPDATE "items" SET"#));
        assert!(sql.contains(r#""unit_price" = "unit_price" * 83"#));
        assert!(sql.contains(r#""cost_price" = "cost_price" * 83"#));
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn test_normalize_countries_matches_null_blank_and_us_spellings() {
        let sql = sql(normalize_countries(&plan()));
        assert!(sql.contains(r#""country" = 'India'"#));
        assert!(sql.contains(r#""country" IS NULL"#));
        assert!(sql.contains("LOWER(TRIM(country)) IN ("));
        assert!(sql.contains("'united states of america'"));
        assert!(sql.contains("'usa'"));
        assert!(sql.contains("''"));
    }

    #[test]
    fn test_backfill_gst_rates_only_touches_zero_rates() {
        let sql = sql(backfill_gst_rates(&plan()));
        assert!(sql.contains(r#""gst_rate" = 18"#));
        assert!(sql.contains(r#"WHERE "items"."gst_rate" = 0"#));
    }
}
