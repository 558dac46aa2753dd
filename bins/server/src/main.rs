//! Hisaab API Server
//!
//! Main entry point for the Hisaab billing service.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hisaab_api::{AppState, create_router};
use hisaab_db::connect_with;
use hisaab_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hisaab=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    info!(
        seller_state = %config.billing.seller_state,
        payment_terms_days = config.billing.default_payment_terms_days,
        "Billing defaults loaded"
    );
    let state = AppState::new(db, config.billing);

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
