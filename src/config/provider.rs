//! Payment provider API settings.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_api_key")]
    pub api_key: SecretString,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_api_key() -> SecretString {
    SecretString::new(String::new())
}

fn default_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            base_url: default_base_url(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let key = self.api_key.expose_secret();
        if key.is_empty() {
            return Err(ConfigError::Validation(
                "provider api_key is required".to_string(),
            ));
        }
        if !key.starts_with("sk_") {
            return Err(ConfigError::Validation(
                "provider api_key must start with sk_".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "provider fetch_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
