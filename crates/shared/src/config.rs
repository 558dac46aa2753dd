//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Billing defaults.
    #[serde(default)]
    pub billing: BillingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Billing defaults used when a request or a record leaves them open.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// State the business is registered in; decides CGST/SGST vs IGST.
    #[serde(default = "default_seller_state")]
    pub seller_state: String,
    /// Payment terms for parties without their own.
    #[serde(default = "default_payment_terms_days")]
    pub default_payment_terms_days: u32,
    /// Country written to parties by the currency migration.
    #[serde(default = "default_country")]
    pub default_country: String,
    /// GST rate backfilled onto zero-rated items by the currency migration.
    #[serde(default = "default_gst_rate")]
    pub default_gst_rate: Decimal,
}

fn default_seller_state() -> String {
    "Maharashtra".to_string()
}

fn default_payment_terms_days() -> u32 {
    30
}

fn default_country() -> String {
    "India".to_string()
}

fn default_gst_rate() -> Decimal {
    Decimal::from(18)
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            seller_state: default_seller_state(),
            default_payment_terms_days: default_payment_terms_days(),
            default_country: default_country(),
            default_gst_rate: default_gst_rate(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("HISAAB").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
