//! Application configuration.
//!
//! Loaded from environment variables with the `BILLSYNC` prefix and `__`
//! as the nesting separator, e.g. `BILLSYNC__SERVER__PORT=9000` or
//! `BILLSYNC__PROVIDER__API_KEY=sk_test_...`. A `.env` file is honored in
//! development.

pub mod billing;
pub mod error;
pub mod provider;
pub mod server;

use serde::Deserialize;

pub use billing::BillingConfig;
pub use error::ConfigError;
pub use provider::ProviderConfig;
pub use server::ServerConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub billing: BillingConfig,

    #[serde(default)]
    pub provider: ProviderConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("BILLSYNC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.billing.validate()?;
        self.provider.validate()?;
        self.server.socket_addr()?;
        Ok(())
    }
}
