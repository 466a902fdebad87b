use serde::Deserialize;
use std::env;
use veranda_core::pricing::FeeSchedule;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub gateway: GatewayConfig,
    pub fees: FeesConfig,
    pub polling: PollingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

/// Hosted payment widget settings. The merchant key and redirect base
/// are deployment-specific; the redirect base is where the gateway
/// sends the user back after checkout.
#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub merchant_key: String,
    pub currency: String,
    pub display_name: String,
    #[serde(default = "default_theme_color")]
    pub theme_color: String,
    pub redirect_base: String,
}

fn default_theme_color() -> String {
    "#3399cc".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeesConfig {
    pub cleaning_fee: i64,
    pub service_fee: i64,
    pub tax_rate_percent: f64,
}

impl FeesConfig {
    pub fn schedule(&self) -> FeeSchedule {
        FeeSchedule {
            cleaning_fee: self.cleaning_fee,
            service_fee: self.service_fee,
            tax_rate_percent: self.tax_rate_percent,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingConfig {
    #[serde(default = "default_poll_interval")]
    pub interval_seconds: u64,
    #[serde(default = "default_poll_deadline")]
    pub deadline_seconds: u64,
}

fn default_poll_interval() -> u64 {
    5
}

fn default_poll_deadline() -> u64 {
    30
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Then the environment-specific file, if present
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Finally environment variables, e.g. VERANDA_API__BASE_URL
            .add_source(config::Environment::with_prefix("VERANDA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
