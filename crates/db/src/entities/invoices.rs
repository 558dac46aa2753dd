//! `SeaORM` Entity for invoices table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::InvoiceStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub invoice_number: String,
    #[sea_orm(unique)]
    pub transaction_id: Option<Uuid>,
    pub party_id: Option<Uuid>,
    pub status: InvoiceStatus,
    pub issue_date: DateTimeWithTimeZone,
    pub due_date: DateTimeWithTimeZone,
    pub sent_date: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub tax_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub cgst_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub sgst_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub igst_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub discount_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub paid_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub balance_amount: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id"
    )]
    Transactions,
    #[sea_orm(
        belongs_to = "super::parties::Entity",
        from = "Column::PartyId",
        to = "super::parties::Column::Id"
    )]
    Parties,
    #[sea_orm(has_many = "super::invoice_items::Entity")]
    InvoiceItems,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::parties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parties.def()
    }
}

impl Related<super::invoice_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceItems.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
