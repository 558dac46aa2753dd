//! Shared setup for repository integration tests.
//!
//! Tests run against `DATABASE_URL` and are skipped when it is unset.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use hisaab_core::billing::LineInput;
use hisaab_db::entities::sea_orm_active_enums::PartyType;
use hisaab_db::migration::{Migrator, MigratorTrait};
use hisaab_db::repositories::{CreateItemInput, CreatePartyInput, ItemRepository, PartyRepository};
use hisaab_db::entities::{items, parties};
use hisaab_shared::types::ItemId;
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

/// Connects and migrates, or returns `None` when no database is configured.
pub async fn test_db() -> Option<DatabaseConnection> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping");
        return None;
    };
    let db = Database::connect(&url).await.expect("connect to DATABASE_URL");
    Migrator::up(&db, None).await.expect("run migrations");
    Some(db)
}

/// Noon UTC on the given day.
pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

/// A party with a unique name.
pub async fn party(db: &DatabaseConnection, party_type: PartyType, state: &str) -> parties::Model {
    PartyRepository::new(db.clone())
        .create(CreatePartyInput {
            name: format!("Party {}", Uuid::new_v4()),
            party_type,
            email: None,
            phone: None,
            gstin: None,
            address: None,
            city: None,
            state: Some(state.to_string()),
            country: Some("India".to_string()),
            pincode: None,
            credit_limit: Decimal::from(50_000),
            payment_terms: 15,
            is_active: true,
        })
        .await
        .expect("create party")
}

/// An item with a unique SKU.
pub async fn item(db: &DatabaseConnection, unit_price: Decimal, stock: Decimal) -> items::Model {
    ItemRepository::new(db.clone())
        .create(CreateItemInput {
            name: format!("Item {}", Uuid::new_v4()),
            sku: format!("SKU-{}", Uuid::new_v4().simple()),
            description: None,
            category_id: None,
            unit: "pcs".to_string(),
            hsn_code: Some("1006".to_string()),
            unit_price,
            cost_price: unit_price,
            stock_quantity: stock,
            min_stock_level: Decimal::from(2),
            gst_rate: Decimal::from(18),
            is_active: true,
        })
        .await
        .expect("create item")
}

/// A line for `item` at its list price and 18% GST.
pub fn line(item: &items::Model, quantity: Decimal) -> LineInput {
    LineInput {
        item_id: ItemId::from_uuid(item.id),
        quantity,
        unit_price: item.unit_price,
        discount: Decimal::ZERO,
        tax_rate: Decimal::from(18),
    }
}
