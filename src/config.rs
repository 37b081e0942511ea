//! Runtime configuration, read from the environment (and `.env` via dotenvy
//! in the binary).

use std::path::PathBuf;
use thiserror::Error;
use crate::domain::value_objects::DEFAULT_CURRENCY;

pub const ENV_API_URL: &str = "STOREFRONT_API_URL";
pub const ENV_DATA_DIR: &str = "STOREFRONT_DATA_DIR";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "STOREFRONT_HTTP_TIMEOUT_SECS";
pub const ENV_CURRENCY: &str = "STOREFRONT_CURRENCY";
pub const ENV_REQUIRE_AUTH_FOR_ADD: &str = "STOREFRONT_REQUIRE_AUTH_FOR_ADD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct StorefrontConfig {
    pub api_base_url: String,
    pub data_dir: PathBuf,
    pub http_timeout_secs: u64,
    pub currency: String,
    /// Anonymous visitors get an auth prompt instead of a local cart add.
    pub require_auth_for_add: bool,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            data_dir: PathBuf::from(".storefront"),
            http_timeout_secs: 10,
            currency: DEFAULT_CURRENCY.to_string(),
            require_auth_for_add: false,
        }
    }
}

impl StorefrontConfig {
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(|key| std::env::var(key).ok()) }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.api_base_url = url.trim().to_string();
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            config.http_timeout_secs = raw.trim().parse::<u64>().ok().filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue { key: ENV_HTTP_TIMEOUT_SECS, value: raw })?;
        }
        if let Some(currency) = lookup(ENV_CURRENCY).filter(|v| !v.trim().is_empty()) {
            config.currency = currency.trim().to_uppercase();
        }
        if let Some(raw) = lookup(ENV_REQUIRE_AUTH_FOR_ADD) {
            config.require_auth_for_add = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => return Err(ConfigError::InvalidValue { key: ENV_REQUIRE_AUTH_FOR_ADD, value: raw }),
            };
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.currency, "INR");
        assert_eq!(config.http_timeout_secs, 10);
        assert!(!config.require_auth_for_add);
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://shop.example.com"),
            (ENV_HTTP_TIMEOUT_SECS, "3"),
            (ENV_CURRENCY, "inr"),
            (ENV_REQUIRE_AUTH_FOR_ADD, "yes"),
        ])).unwrap();
        assert_eq!(config.api_base_url, "https://shop.example.com");
        assert_eq!(config.http_timeout_secs, 3);
        assert!(config.require_auth_for_add);
    }

    #[test]
    fn test_invalid_values() {
        assert!(StorefrontConfig::from_lookup(lookup(&[(ENV_HTTP_TIMEOUT_SECS, "soon")])).is_err());
        assert!(StorefrontConfig::from_lookup(lookup(&[(ENV_HTTP_TIMEOUT_SECS, "0")])).is_err());
        assert!(StorefrontConfig::from_lookup(lookup(&[(ENV_REQUIRE_AUTH_FOR_ADD, "maybe")])).is_err());
    }
}
