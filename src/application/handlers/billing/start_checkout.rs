//! Checkout initiation.
//!
//! Creates a hosted checkout session with correlation metadata stamped on
//! both the session and the subscription it will create. The webhook
//! pipeline later reads that metadata back to bootstrap the account's
//! provider association.

use std::sync::Arc;

use crate::domain::billing::{BillingError, CorrelationMetadata};
use crate::domain::foundation::AccountId;
use crate::ports::{AccountStore, CheckoutRedirect, CheckoutSessionRequest, ProviderClient};

#[derive(Debug, Clone)]
pub struct StartCheckoutCommand {
    pub account_id: AccountId,
    pub price_id: String,
    pub plan: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

pub struct StartCheckoutHandler {
    accounts: Arc<dyn AccountStore>,
    provider: Arc<dyn ProviderClient>,
}

impl StartCheckoutHandler {
    pub fn new(accounts: Arc<dyn AccountStore>, provider: Arc<dyn ProviderClient>) -> Self {
        Self { accounts, provider }
    }

    pub async fn handle(
        &self,
        command: StartCheckoutCommand,
    ) -> Result<CheckoutRedirect, BillingError> {
        let account = self
            .accounts
            .find_by_id(&command.account_id)
            .await?
            .ok_or_else(|| BillingError::AccountNotFound(command.account_id.to_string()))?;

        let correlation = CorrelationMetadata {
            account_id: account.id,
            entity_kind: account.entity_kind,
            plan: command.plan,
        };

        let redirect = self
            .provider
            .create_checkout_session(&CheckoutSessionRequest {
                correlation,
                price_id: command.price_id,
                success_url: command.success_url,
                cancel_url: command.cancel_url,
            })
            .await?;

        tracing::info!(
            account_id = %account.id,
            session_id = %redirect.session_id,
            "checkout session created"
        );
        Ok(redirect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryAccountStore;
    use crate::domain::billing::{BillingAccount, EntityKind};
    use crate::ports::ProviderSubscription;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingProvider {
        last_request: Mutex<Option<CheckoutSessionRequest>>,
    }

    #[async_trait]
    impl ProviderClient for RecordingProvider {
        async fn get_subscription(
            &self,
            subscription_id: &str,
        ) -> Result<ProviderSubscription, BillingError> {
            Err(BillingError::ProviderUnavailable(subscription_id.into()))
        }

        async fn create_checkout_session(
            &self,
            request: &CheckoutSessionRequest,
        ) -> Result<CheckoutRedirect, BillingError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            Ok(CheckoutRedirect {
                session_id: "cs_test".to_string(),
                url: "https://checkout.example/cs_test".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn stamps_correlation_metadata_from_account() {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let account = BillingAccount::new(AccountId::new(), EntityKind::Corporate);
        accounts.insert(account.clone()).await.unwrap();
        let provider = Arc::new(RecordingProvider {
            last_request: Mutex::new(None),
        });
        let handler = StartCheckoutHandler::new(accounts, provider.clone());

        let redirect = handler
            .handle(StartCheckoutCommand {
                account_id: account.id,
                price_id: "price_team".to_string(),
                plan: Some("team-annual".to_string()),
                success_url: "https://app.example/billing/success".to_string(),
                cancel_url: "https://app.example/billing/cancel".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(redirect.session_id, "cs_test");
        let request = provider.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.correlation.account_id, account.id);
        assert_eq!(request.correlation.entity_kind, EntityKind::Corporate);
        assert_eq!(request.correlation.plan.as_deref(), Some("team-annual"));
    }

    #[tokio::test]
    async fn unknown_account_is_rejected() {
        let handler = StartCheckoutHandler::new(
            Arc::new(InMemoryAccountStore::new()),
            Arc::new(RecordingProvider {
                last_request: Mutex::new(None),
            }),
        );

        let err = handler
            .handle(StartCheckoutCommand {
                account_id: AccountId::new(),
                price_id: "price_solo".to_string(),
                plan: None,
                success_url: "https://app.example/s".to_string(),
                cancel_url: "https://app.example/c".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::AccountNotFound(_)));
    }
}
