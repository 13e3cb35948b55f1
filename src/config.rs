use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";

/// Tunables for the analytics pipeline and scenario simulator.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AnalyticsConfig {
    /// Default forecast horizon in days
    #[serde(default = "default_forecast_horizon")]
    #[validate(range(min = 1, max = 30))]
    pub forecast_horizon_days: u32,

    /// Own-price demand elasticity used by price-change scenarios
    #[serde(default = "default_price_elasticity")]
    pub price_elasticity: f64,

    /// Cross-price elasticity used by competitor-move scenarios
    #[serde(default = "default_cross_elasticity")]
    pub cross_elasticity: f64,

    /// Sales lift per discount point in promotion scenarios
    #[serde(default = "default_promotion_lift_factor")]
    pub promotion_lift_factor: f64,

    /// Maximum products sampled by catalog-wide scenarios
    #[serde(default = "default_global_sample_limit")]
    pub global_sample_limit: usize,
}

fn default_forecast_horizon() -> u32 {
    7
}
fn default_price_elasticity() -> f64 {
    1.2
}
fn default_cross_elasticity() -> f64 {
    0.7
}
fn default_promotion_lift_factor() -> f64 {
    2.0
}
fn default_global_sample_limit() -> usize {
    50
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            forecast_horizon_days: default_forecast_horizon(),
            price_elasticity: default_price_elasticity(),
            cross_elasticity: default_cross_elasticity(),
            promotion_lift_factor: default_promotion_lift_factor(),
            global_sample_limit: default_global_sample_limit(),
        }
    }
}

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_env")]
    pub environment: String,

    /// Logging level filter
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Maximum database connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Minimum database connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    #[serde(default)]
    #[validate]
    pub analytics: AnalyticsConfig,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_env() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}

impl AppConfig {
    /// Minimal constructor used by tests and embedding callers.
    pub fn new(database_url: String, host: String, port: u16, environment: String) -> Self {
        Self {
            database_url,
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            analytics: AnalyticsConfig::default(),
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Load configuration from layered sources: `config/default.toml`, an
/// environment-specific file, then `APP_*` environment variables.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = env::var("APP_ENVIRONMENT").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let cfg = Config::builder()
        .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
        .add_source(File::with_name(&format!("{CONFIG_DIR}/{run_env}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .set_default("environment", run_env)?
        .build()?;

    let app_config: AppConfig = cfg.try_deserialize()?;
    app_config
        .validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {e}")))?;
    Ok(app_config)
}

/// Install the global tracing subscriber. Honors `RUST_LOG` when set,
/// otherwise falls back to the configured level.
pub fn init_tracing(log_level: &str, log_json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("shelfsense_api={log_level},tower_http=info")));

    if log_json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}
