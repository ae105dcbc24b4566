//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `ROCKETSHOES_API_URL` - Base URL of the catalog/stock API (default: `http://localhost:3333`)
//! - `ROCKETSHOES_STORAGE_PATH` - File backing the durable key-value slot
//!   (default: `.rocketshoes/storage.json`)
//! - `ROCKETSHOES_STORAGE_KEY` - Key of the persisted cart (default: `@RocketShoes:cart`)
//! - `ROCKETSHOES_PRODUCT_CACHE_TTL_SECS` - Product metadata cache TTL, `0` disables (default: 300)
//! - `ROCKETSHOES_CURRENCY` - Display currency code (default: `BRL`)

use std::path::PathBuf;
use std::time::Duration;

use rocketshoes_core::CurrencyCode;
use thiserror::Error;
use url::Url;

/// Default key of the persisted cart slot.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_STORAGE_PATH: &str = ".rocketshoes/storage.json";
const DEFAULT_PRODUCT_CACHE_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Catalog and stock API configuration
    pub api: ApiConfig,
    /// File backing the durable key-value slot
    pub storage_path: PathBuf,
    /// Key under which the cart is persisted
    pub storage_key: String,
    /// Currency used when formatting prices
    pub currency: CurrencyCode,
}

/// Catalog and stock API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; `products/{id}` and `stock/{id}` are resolved below it
    pub base_url: Url,
    /// Product metadata cache TTL (`None` disables caching)
    pub product_cache_ttl: Option<Duration>,
}

impl ApiConfig {
    /// Configuration for an API at `base_url` with no product cache.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL cannot be used as a base.
    pub fn uncached(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("ROCKETSHOES_API_URL", base_url)?,
            product_cache_ttl: None,
        })
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let base_url = parse_base_url(
            "ROCKETSHOES_API_URL",
            &get_or("ROCKETSHOES_API_URL", DEFAULT_API_URL),
        )?;

        let ttl_secs = get_or(
            "ROCKETSHOES_PRODUCT_CACHE_TTL_SECS",
            DEFAULT_PRODUCT_CACHE_TTL_SECS,
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar(
                "ROCKETSHOES_PRODUCT_CACHE_TTL_SECS".to_string(),
                e.to_string(),
            )
        })?;
        let product_cache_ttl = (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs));

        let storage_path = PathBuf::from(get_or("ROCKETSHOES_STORAGE_PATH", DEFAULT_STORAGE_PATH));

        let storage_key = get_or("ROCKETSHOES_STORAGE_KEY", DEFAULT_STORAGE_KEY);
        if storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "ROCKETSHOES_STORAGE_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let currency = get_or("ROCKETSHOES_CURRENCY", "BRL")
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("ROCKETSHOES_CURRENCY".to_string(), e))?;

        Ok(Self {
            api: ApiConfig {
                base_url,
                product_cache_ttl,
            },
            storage_path,
            storage_key,
            currency,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an http(s) URL that relative resource paths can be joined onto.
fn parse_base_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }

    Ok(url)
}
