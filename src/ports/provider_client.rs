//! Payment provider API port.

use async_trait::async_trait;

use crate::domain::billing::{BillingError, CorrelationMetadata};

/// Subscription state as returned by the provider's API (not the webhook
/// payload). Authoritative when re-fetched during checkout handling.
#[derive(Debug, Clone)]
pub struct ProviderSubscription {
    pub id: String,
    pub customer_id: String,
    pub status: String,
    pub current_period_end: Option<i64>,
}

/// Request to open a hosted checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub correlation: CorrelationMetadata,
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// A created checkout session the caller redirects the user to.
#[derive(Debug, Clone)]
pub struct CheckoutRedirect {
    pub session_id: String,
    pub url: String,
}

/// Outbound calls to the payment provider's API.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Fetches the current state of a subscription.
    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<ProviderSubscription, BillingError>;

    /// Creates a hosted checkout session with correlation metadata stamped
    /// on both the session and the subscription it will create.
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutRedirect, BillingError>;
}
