//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GLOSSY_CART_KEY` - Persisted slot key (default: `beauty_cart`)
//! - `GLOSSY_FREE_SHIPPING_THRESHOLD` - Subtotals above this ship free (default: 50)
//! - `GLOSSY_SHIPPING_FEE` - Flat shipping fee (default: 5)
//! - `GLOSSY_CURRENCY_SYMBOL` - Symbol printed before amounts (default: `S/.`)
//! - `GLOSSY_STORE_NAME` - Store name on the proforma header (default: `GLOSSY BEAUTY`)

use glossy_core::Price;
use thiserror::Error;

use crate::totals::ShippingPolicy;

/// Default persisted slot key.
pub const DEFAULT_STORAGE_KEY: &str = "beauty_cart";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Key of the persisted slot
    pub storage_key: String,
    /// Shipping fee rules
    pub shipping: ShippingPolicy,
    /// Currency symbol used when formatting amounts
    pub currency_symbol: String,
    /// Store name printed on documents
    pub store_name: String,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            shipping: ShippingPolicy::default(),
            currency_symbol: "S/.".to_string(),
            store_name: "GLOSSY BEAUTY".to_string(),
        }
    }
}

impl CartConfig {
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
        let defaults = Self::default();

        let storage_key = lookup("GLOSSY_CART_KEY").unwrap_or(defaults.storage_key);
        if storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "GLOSSY_CART_KEY".to_string(),
                "cannot be empty".to_string(),
            ));
        }

        let free_threshold = get_price(
            &lookup,
            "GLOSSY_FREE_SHIPPING_THRESHOLD",
            defaults.shipping.free_threshold,
        )?;
        let flat_fee = get_price(&lookup, "GLOSSY_SHIPPING_FEE", defaults.shipping.flat_fee)?;

        Ok(Self {
            storage_key,
            shipping: ShippingPolicy {
                free_threshold,
                flat_fee,
            },
            currency_symbol: lookup("GLOSSY_CURRENCY_SYMBOL").unwrap_or(defaults.currency_symbol),
            store_name: lookup("GLOSSY_STORE_NAME").unwrap_or(defaults.store_name),
        })
    }

    /// Format an amount with the configured currency symbol.
    #[must_use]
    pub fn format_price(&self, price: Price) -> String {
        price.display(&self.currency_symbol)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a price-valued variable with a default value.
fn get_price(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Price,
) -> Result<Price, ConfigError> {
    lookup(key).map_or(Ok(default), |raw| {
        Price::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = CartConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, CartConfig::default());
        assert_eq!(config.storage_key, "beauty_cart");
        assert_eq!(config.shipping.free_threshold, Price::from_cents(5000));
        assert_eq!(config.shipping.flat_fee, Price::from_cents(500));
    }

    #[test]
    fn test_overrides() {
        let config = CartConfig::from_lookup(lookup_from(&[
            ("GLOSSY_CART_KEY", "test_cart"),
            ("GLOSSY_FREE_SHIPPING_THRESHOLD", "100"),
            ("GLOSSY_SHIPPING_FEE", "7.50"),
            ("GLOSSY_CURRENCY_SYMBOL", "$"),
        ]))
        .unwrap();

        assert_eq!(config.storage_key, "test_cart");
        assert_eq!(config.shipping.free_threshold, Price::from_cents(10000));
        assert_eq!(config.shipping.flat_fee, Price::from_cents(750));
        assert_eq!(config.format_price(Price::from_cents(199)), "$ 1.99");
    }

    #[test]
    fn test_invalid_fee() {
        let result = CartConfig::from_lookup(lookup_from(&[("GLOSSY_SHIPPING_FEE", "five")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "GLOSSY_SHIPPING_FEE"));
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = CartConfig::from_lookup(lookup_from(&[("GLOSSY_CART_KEY", "  ")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }
}
