use crate::core::{AppError, Result};
use std::env;
use std::time::Duration;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

const MIDTRANS_SANDBOX_SNAP_URL: &str = "https://app.sandbox.midtrans.com";
const MIDTRANS_SANDBOX_API_URL: &str = "https://api.sandbox.midtrans.com";
const MIDTRANS_PRODUCTION_SNAP_URL: &str = "https://app.midtrans.com";
const MIDTRANS_PRODUCTION_API_URL: &str = "https://api.midtrans.com";

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub midtrans: MidtransConfig,
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    /// Public URL of the donation site (CORS origin, e-wallet callbacks)
    pub public_url: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone)]
pub struct MidtransConfig {
    pub server_key: String,
    pub snap_base_url: String,
    pub api_base_url: String,
    pub timeout: Duration,
}

// Keeps the server key out of debug logs.
impl std::fmt::Debug for MidtransConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidtransConfig")
            .field("server_key", &"<redacted>")
            .field("snap_base_url", &self.snap_base_url)
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WebhookConfig {
    pub require_signature: bool,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let app = AppConfig {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            public_url: env::var("APP_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let is_production_gateway = parse_bool("MIDTRANS_IS_PRODUCTION", false)?;
        let (default_snap, default_api) = if is_production_gateway {
            (MIDTRANS_PRODUCTION_SNAP_URL, MIDTRANS_PRODUCTION_API_URL)
        } else {
            (MIDTRANS_SANDBOX_SNAP_URL, MIDTRANS_SANDBOX_API_URL)
        };

        let midtrans = MidtransConfig {
            server_key: env::var("MIDTRANS_SERVER_KEY").map_err(|_| {
                AppError::Configuration("MIDTRANS_SERVER_KEY not set".to_string())
            })?,
            snap_base_url: env::var("MIDTRANS_SNAP_URL")
                .unwrap_or_else(|_| default_snap.to_string()),
            api_base_url: env::var("MIDTRANS_API_URL")
                .unwrap_or_else(|_| default_api.to_string()),
            timeout: Duration::from_secs(
                env::var("MIDTRANS_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid MIDTRANS_TIMEOUT_SECS".to_string())
                    })?,
            ),
        };

        let bypass = parse_bool("BYPASS_WEBHOOK_VERIFICATION", false)?;
        let webhook = WebhookConfig {
            require_signature: app.is_production() && !bypass,
        };

        Ok(Config {
            app,
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            midtrans,
            webhook,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.midtrans.server_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "MIDTRANS_SERVER_KEY must not be empty".to_string(),
            ));
        }

        if self.midtrans.timeout.is_zero() {
            return Err(AppError::Configuration(
                "MIDTRANS_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        if self.database.max_connections == 0
            || self.database.min_connections > self.database.max_connections
        {
            return Err(AppError::Configuration(
                "Database pool bounds are inconsistent".to_string(),
            ));
        }

        if !(self.app.public_url.starts_with("http://") || self.app.public_url.starts_with("https://"))
        {
            return Err(AppError::Configuration(
                "APP_URL must be an http(s) origin".to_string(),
            ));
        }

        if self.app.is_production() && !self.webhook.require_signature {
            tracing::warn!("Webhook signature verification is bypassed in production");
        }

        Ok(())
    }
}

fn parse_bool(key: &str, default: bool) -> Result<bool> {
    match env::var(key) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            _ => Err(AppError::Configuration(format!("Invalid {}", key))),
        },
        Err(_) => Ok(default),
    }
}
