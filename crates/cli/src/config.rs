//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GLOSSY_CART_DIR` - Directory holding the persisted cart (default: `.glossy`)
//! - `GLOSSY_API_URL` - Catalog API base URL (default: `http://localhost:8080/api`)
//! - `GLOSSY_SYNC_INTERVAL_MS` - How often `watch` polls the cart file (default: 500)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! Cart settings (`GLOSSY_CART_KEY`, shipping, currency) are read by
//! [`CartConfig`].

use std::path::PathBuf;
use std::time::Duration;

use glossy_cart::CartConfig;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error(transparent)]
    Cart(#[from] glossy_cart::ConfigError),
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Cart store settings
    pub cart: CartConfig,
    /// Directory of the file-backed cart slot
    pub cart_dir: PathBuf,
    /// Catalog API base URL
    pub api_url: Url,
    /// Poll interval for external cart changes
    pub sync_interval: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<SecretString>,
    /// Sentry environment (e.g., "production")
    pub sentry_environment: Option<String>,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let cart = CartConfig::from_lookup(&lookup)?;

        let cart_dir = PathBuf::from(get_or_default(&lookup, "GLOSSY_CART_DIR", ".glossy"));

        let api_url = Url::parse(&get_or_default(
            &lookup,
            "GLOSSY_API_URL",
            "http://localhost:8080/api",
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("GLOSSY_API_URL".to_string(), e.to_string()))?;
        if api_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "GLOSSY_API_URL".to_string(),
                "must be an http(s) URL".to_string(),
            ));
        }

        let sync_interval = get_or_default(&lookup, "GLOSSY_SYNC_INTERVAL_MS", "500")
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "GLOSSY_SYNC_INTERVAL_MS".to_string(),
                    "must be a positive number of milliseconds".to_string(),
                )
            })?;

        Ok(Self {
            cart,
            cart_dir,
            api_url,
            sync_interval,
            sentry_dsn: lookup("SENTRY_DSN").map(SecretString::from),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }
}

/// Get a variable with a default value.
fn get_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}
