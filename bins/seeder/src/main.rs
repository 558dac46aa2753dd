//! Database seeder for Hisaab development and testing.
//!
//! Seeds a handful of parties, categories and stocked items so the POS and
//! invoicing flows can be exercised locally. Running it twice is harmless.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use hisaab_db::entities::{
    categories, items, parties, sea_orm_active_enums::PartyType,
};
use hisaab_db::repositories::{
    CategoryRepository, CreateCategoryInput, CreateItemInput, CreatePartyInput, ItemRepository,
    PartyRepository,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

struct SeedParty {
    name: &'static str,
    party_type: PartyType,
    state: &'static str,
    gstin: Option<&'static str>,
    payment_terms: i32,
}

const PARTIES: &[SeedParty] = &[
    SeedParty {
        name: "Sharma General Store",
        party_type: PartyType::Customer,
        state: "Maharashtra",
        gstin: Some("27AAPFS1234K1Z5"),
        payment_terms: 15,
    },
    SeedParty {
        name: "Bengaluru Retail Co",
        party_type: PartyType::Customer,
        state: "Karnataka",
        gstin: Some("29AABCB5678L1Z2"),
        payment_terms: 30,
    },
    SeedParty {
        name: "Deccan Wholesale Supplies",
        party_type: PartyType::Supplier,
        state: "Maharashtra",
        gstin: Some("27AADCD9012M1Z8"),
        payment_terms: 45,
    },
    SeedParty {
        name: "Gujarat Packaging Works",
        party_type: PartyType::Vendor,
        state: "Gujarat",
        gstin: None,
        payment_terms: 30,
    },
];

struct SeedItem {
    name: &'static str,
    sku: &'static str,
    category: &'static str,
    hsn_code: &'static str,
    unit_price: Decimal,
    cost_price: Decimal,
    stock: Decimal,
    gst_rate: Decimal,
}

const CATEGORIES: &[(&str, &str)] = &[
    ("Stationery", "Pens, notebooks and office paper"),
    ("Groceries", "Packaged food staples"),
    ("Electronics", "Small appliances and accessories"),
];

fn seed_items() -> Vec<SeedItem> {
    vec![
        SeedItem {
            name: "Ball Pen (Blue)",
            sku: "STN-PEN-001",
            category: "Stationery",
            hsn_code: "9608",
            unit_price: dec!(10),
            cost_price: dec!(6.50),
            stock: dec!(500),
            gst_rate: dec!(18),
        },
        SeedItem {
            name: "A4 Notebook 200 Pages",
            sku: "STN-NB-002",
            category: "Stationery",
            hsn_code: "4820",
            unit_price: dec!(85),
            cost_price: dec!(60),
            stock: dec!(120),
            gst_rate: dec!(12),
        },
        SeedItem {
            name: "Basmati Rice 5kg",
            sku: "GRC-RICE-005",
            category: "Groceries",
            hsn_code: "1006",
            unit_price: dec!(650),
            cost_price: dec!(540),
            stock: dec!(40),
            gst_rate: dec!(5),
        },
        SeedItem {
            name: "USB-C Charger 20W",
            sku: "ELC-CHG-020",
            category: "Electronics",
            hsn_code: "8504",
            unit_price: dec!(899),
            cost_price: dec!(610),
            stock: dec!(3),
            gst_rate: dec!(18),
        },
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = hisaab_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    println!("Seeding parties...");
    seed_parties(&db).await?;

    println!("Seeding categories...");
    seed_categories(&db).await?;

    println!("Seeding items...");
    seed_catalog(&db).await?;

    println!("Seeding complete!");
    Ok(())
}

async fn seed_parties(db: &DatabaseConnection) -> anyhow::Result<()> {
    let repo = PartyRepository::new(db.clone());
    for seed in PARTIES {
        let exists = parties::Entity::find()
            .filter(parties::Column::Name.eq(seed.name))
            .one(db)
            .await?
            .is_some();
        if exists {
            println!("  {} already exists, skipping...", seed.name);
            continue;
        }

        repo.create(CreatePartyInput {
            name: seed.name.to_string(),
            party_type: seed.party_type,
            email: None,
            phone: None,
            gstin: seed.gstin.map(str::to_string),
            address: None,
            city: None,
            state: Some(seed.state.to_string()),
            country: Some("India".to_string()),
            pincode: None,
            credit_limit: dec!(100000),
            payment_terms: seed.payment_terms,
            is_active: true,
        })
        .await?;
        println!("  Created {}", seed.name);
    }
    Ok(())
}

async fn seed_categories(db: &DatabaseConnection) -> anyhow::Result<()> {
    let repo = CategoryRepository::new(db.clone());
    for (name, description) in CATEGORIES {
        if category_id(db, name).await?.is_some() {
            println!("  {name} already exists, skipping...");
            continue;
        }

        repo.create(CreateCategoryInput {
            name: (*name).to_string(),
            description: Some((*description).to_string()),
            parent_id: None,
        })
        .await?;
        println!("  Created {name}");
    }
    Ok(())
}

async fn seed_catalog(db: &DatabaseConnection) -> anyhow::Result<()> {
    let repo = ItemRepository::new(db.clone());
    for seed in seed_items() {
        let exists = items::Entity::find()
            .filter(items::Column::Sku.eq(seed.sku))
            .one(db)
            .await?
            .is_some();
        if exists {
            println!("  {} already exists, skipping...", seed.sku);
            continue;
        }

        repo.create(CreateItemInput {
            name: seed.name.to_string(),
            sku: seed.sku.to_string(),
            description: None,
            category_id: category_id(db, seed.category).await?,
            unit: "pcs".to_string(),
            hsn_code: Some(seed.hsn_code.to_string()),
            unit_price: seed.unit_price,
            cost_price: seed.cost_price,
            stock_quantity: seed.stock,
            min_stock_level: dec!(5),
            gst_rate: seed.gst_rate,
            is_active: true,
        })
        .await?;
        println!("  Created {} ({})", seed.name, seed.sku);
    }
    Ok(())
}

async fn category_id(db: &DatabaseConnection, name: &str) -> anyhow::Result<Option<Uuid>> {
    let category = categories::Entity::find()
        .filter(categories::Column::Name.eq(name))
        .one(db)
        .await?;
    Ok(category.map(|c| c.id))
}
