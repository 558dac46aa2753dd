//! Converts every stored amount from USD to INR.
//!
//! Run this exactly once per database: a second run multiplies again.
//! Without `--confirm` it only prints the plan.
//!
//! Usage: convert-currency --rate 83 --confirm

use anyhow::{Context, bail};
use clap::Parser;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hisaab_core::migration::MigrationPlan;
use hisaab_db::{CurrencyMigrationRepository, connect_with};
use hisaab_shared::AppConfig;

#[derive(Debug, Parser)]
#[command(
    name = "convert-currency",
    about = "Multiply every money column by a USD to INR rate",
    version
)]
struct Cli {
    /// INR per USD.
    #[arg(long, default_value = "83")]
    rate: Decimal,

    /// Country written over blank and US country values (default: billing config).
    #[arg(long)]
    default_country: Option<String>,

    /// GST rate written over zero item rates (default: billing config).
    #[arg(long)]
    default_gst_rate: Option<Decimal>,

    /// Apply the migration. Without it the plan is printed and nothing changes.
    #[arg(long)]
    confirm: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hisaab=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    let plan = MigrationPlan::new(
        cli.rate,
        cli.default_country
            .unwrap_or_else(|| config.billing.default_country.clone()),
        cli.default_gst_rate
            .unwrap_or(config.billing.default_gst_rate),
    )?;

    println!(
        "Converting {} to {} at {} per unit",
        plan.from_currency(),
        plan.to_currency(),
        plan.rate()
    );
    println!(
        "Blank or US countries become {:?}; zero GST rates become {}%",
        plan.default_country(),
        plan.default_gst_rate()
    );

    if !cli.confirm {
        bail!("Dry run only. Re-run with --confirm to apply; the migration is not idempotent.");
    }

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let report = CurrencyMigrationRepository::new(db)
        .migrate_amounts(&plan)
        .await?;

    println!("Migration committed. Rows updated:");
    println!("{report}");
    Ok(())
}
