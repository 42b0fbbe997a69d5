//! Environment-based configuration module
//!
//! Settings for the storefront core differ between environments:
//! - Development: verbose human-readable logging, local backend gateway
//! - Production: JSON logging, HTTPS backend gateway required
//!
//! Configuration can be set via:
//! 1. Environment variables (highest priority)
//! 2. .env file
//! 3. Default values (lowest priority)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::errors::AppError;

pub const DEFAULT_CURRENCY_SYMBOL: &str = "£";

/// Application environment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// Get environment from APP_ENV variable or default to Development
    pub fn from_env() -> Self {
        match env::var("APP_ENV").unwrap_or_default().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub app_name: String,
    pub version: String,
    pub backend: BackendConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

/// Where the storefront backend gateway lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL, e.g. https://vault.example.com
    pub base_url: String,

    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,

    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Symbol prefixed to formatted prices
    pub currency_symbol: String,

    /// Length of an ad-free membership in days
    pub membership_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,

    pub log_to_file: bool,

    pub log_to_stdout: bool,

    /// Use JSON format (true for production)
    pub json_format: bool,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|s| matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::from_env();

        Self {
            environment: env,
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "Game Vault".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),

            backend: BackendConfig {
                base_url: env::var("BACKEND_URL")
                    .unwrap_or_else(|_| "http://127.0.0.1:4943".to_string()),
                request_timeout_secs: env_parse("BACKEND_TIMEOUT_SECS").unwrap_or(15),
                connect_timeout_secs: env_parse("BACKEND_CONNECT_TIMEOUT_SECS").unwrap_or(10),
            },

            store: StoreConfig {
                currency_symbol: env::var("CURRENCY_SYMBOL")
                    .unwrap_or_else(|_| DEFAULT_CURRENCY_SYMBOL.to_string()),
                membership_days: env_parse("MEMBERSHIP_DAYS").unwrap_or(30),
            },

            logging: LoggingConfig {
                level: env::var("RUST_LOG").unwrap_or_else(|_| {
                    if env.is_production() { "warn".to_string() } else { "debug".to_string() }
                }),
                log_to_file: env_flag("LOG_TO_FILE", true),
                log_to_stdout: env_flag("LOG_TO_STDOUT", true),
                json_format: env.is_production(),
            },
        }
    }
}

/// Load `<app_data_dir>/.env` into the process environment, falling back to
/// a `.env` in the working directory or its parents. Variables already set
/// win. Returns the file that was read, if any.
pub fn load_dotenv(app_data_dir: &Path) -> Option<PathBuf> {
    let local = app_data_dir.join(".env");
    if local.exists() {
        dotenvy::from_path(&local).ok()?;
        return Some(local);
    }
    dotenvy::dotenv().ok()
}

impl AppConfig {
    /// Load configuration from environment and defaults
    pub fn load() -> Self {
        Self::default()
    }

    /// Load a .env file (if it exists) into the process environment, then
    /// build the configuration from it.
    pub fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        dotenvy::from_path(path).ok()?;
        Some(Self::default())
    }

    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    /// Validate configuration for production
    pub fn validate(&self) -> Result<(), AppError> {
        let url = self.backend.base_url.trim();
        if url.is_empty() {
            return Err(AppError::validation("BACKEND_URL must not be empty"));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::validation(
                "BACKEND_URL must start with http:// or https://",
            ));
        }
        if self.is_production() && !url.starts_with("https://") {
            return Err(AppError::validation(
                "BACKEND_URL must use https:// in production",
            ));
        }
        if self.backend.request_timeout_secs == 0 {
            return Err(AppError::validation("BACKEND_TIMEOUT_SECS must be positive"));
        }
        Ok(())
    }
}

static GLOBAL_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Initialize the global configuration
pub fn init_config() -> &'static AppConfig {
    GLOBAL_CONFIG.get_or_init(AppConfig::load)
}

/// Get the global configuration, if `init_config` has run.
pub fn get_config() -> Option<&'static AppConfig> {
    GLOBAL_CONFIG.get()
}

/// Currency symbol from the global config, or the default when not initialized.
pub fn currency_symbol() -> &'static str {
    get_config()
        .map(|c| c.store.currency_symbol.as_str())
        .unwrap_or(DEFAULT_CURRENCY_SYMBOL)
}
