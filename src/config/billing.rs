//! Webhook endpoint secrets.
//!
//! Each integration path carries its own signing secret. A missing secret
//! is allowed at load time; the verifier for that path then rejects every
//! delivery, so an unconfigured endpoint fails closed rather than open.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    pub individual_webhook_secret: Option<SecretString>,
    pub corporate_webhook_secret: Option<SecretString>,

    /// How long processed-event records are kept before the retention
    /// sweep removes them.
    #[serde(default = "default_retention_days")]
    pub processed_event_retention_days: i64,

    /// Interval between retention sweeps.
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
}

fn default_retention_days() -> i64 {
    30
}

fn default_purge_interval_secs() -> u64 {
    3600
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            individual_webhook_secret: None,
            corporate_webhook_secret: None,
            processed_event_retention_days: default_retention_days(),
            purge_interval_secs: default_purge_interval_secs(),
        }
    }
}

impl BillingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, secret) in [
            ("individual_webhook_secret", &self.individual_webhook_secret),
            ("corporate_webhook_secret", &self.corporate_webhook_secret),
        ] {
            if let Some(secret) = secret {
                if !secret.expose_secret().starts_with("whsec_") {
                    return Err(ConfigError::Validation(format!(
                        "{name} must start with whsec_"
                    )));
                }
            }
        }
        if self.processed_event_retention_days <= 0 {
            return Err(ConfigError::Validation(
                "processed_event_retention_days must be positive".to_string(),
            ));
        }
        if self.purge_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "purge_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
