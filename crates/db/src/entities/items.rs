//! `SeaORM` Entity for items table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub sku: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub unit: String,
    pub hsn_code: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub unit_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub cost_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 3)))")]
    pub stock_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 3)))")]
    pub min_stock_level: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub gst_rate: Decimal,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Categories,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
