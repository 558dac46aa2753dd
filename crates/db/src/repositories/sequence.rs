//! Monthly document number allocation.

use chrono::{DateTime, Utc};
use hisaab_core::numbering::{month_prefix, next_sequence, sequenced_number};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

/// Returns the next free `KIND-YYYYMM-NNNN` number for `column` of `E`.
///
/// Numbers are ordered by length first so `INV-202610-10000` sorts after
/// `INV-202610-9999`. Two writers racing for the same number collide on
/// the unique index and the loser fails with a constraint violation.
pub(crate) async fn next_number<E, C>(
    db: &C,
    column: E::Column,
    kind: &str,
    date: DateTime<Utc>,
) -> Result<String, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let prefix = month_prefix(kind, date);
    let latest: Option<String> = E::find()
        .select_only()
        .column(column)
        .filter(column.starts_with(&prefix))
        .order_by_desc(SimpleExpr::from(Func::char_length(Expr::col(column))))
        .order_by_desc(column)
        .into_tuple()
        .one(db)
        .await?;

    Ok(sequenced_number(
        kind,
        date,
        next_sequence(latest.as_deref(), &prefix),
    ))
}
