//! Stripe API client.
//!
//! Implements the provider port against Stripe's REST API. Request bodies
//! are form-encoded per Stripe convention; responses are JSON.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::billing::BillingError;
use crate::ports::{
    CheckoutRedirect, CheckoutSessionRequest, ProviderClient, ProviderSubscription,
};

pub struct StripeProviderClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct SubscriptionResponse {
    id: String,
    customer: String,
    status: String,
    current_period_end: Option<i64>,
}

#[derive(Deserialize)]
struct CheckoutSessionResponse {
    id: String,
    url: String,
}

impl StripeProviderClient {
    pub fn new(api_key: SecretString, base_url: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            timeout,
        }
    }

    fn map_request_error(context: &str, err: reqwest::Error) -> BillingError {
        if err.is_timeout() || err.is_connect() {
            BillingError::ProviderUnavailable(format!("{context}: {err}"))
        } else {
            BillingError::ProviderUnavailable(format!("{context}: request failed: {err}"))
        }
    }
}

#[async_trait]
impl ProviderClient for StripeProviderClient {
    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<ProviderSubscription, BillingError> {
        let url = format!("{}/v1/subscriptions/{}", self.base_url, subscription_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Self::map_request_error("get subscription", e))?;

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            return Err(BillingError::ProviderUnavailable(format!(
                "get subscription: http {status}"
            )));
        }
        if !status.is_success() {
            tracing::warn!(%subscription_id, %status, "subscription fetch rejected");
            return Err(BillingError::ParseError(format!(
                "subscription fetch returned http {status}"
            )));
        }

        let body: SubscriptionResponse = response
            .json()
            .await
            .map_err(|e| BillingError::ParseError(format!("subscription response: {e}")))?;

        Ok(ProviderSubscription {
            id: body.id,
            customer_id: body.customer,
            status: body.status,
            current_period_end: body.current_period_end,
        })
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutRedirect, BillingError> {
        let url = format!("{}/v1/checkout/sessions", self.base_url);

        // Correlation goes on both the session and the subscription it
        // creates, so every later webhook carries it.
        let mut form: Vec<(String, String)> = vec![
            ("mode".into(), "subscription".into()),
            ("line_items[0][price]".into(), request.price_id.clone()),
            ("line_items[0][quantity]".into(), "1".into()),
            ("success_url".into(), request.success_url.clone()),
            ("cancel_url".into(), request.cancel_url.clone()),
        ];
        for (key, value) in request.correlation.to_metadata() {
            form.push((format!("metadata[{key}]"), value.clone()));
            form.push((format!("subscription_data[metadata][{key}]"), value));
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .timeout(self.timeout)
            .form(&form)
            .send()
            .await
            .map_err(|e| Self::map_request_error("create checkout session", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BillingError::ProviderUnavailable(format!(
                "create checkout session: http {status}"
            )));
        }

        let body: CheckoutSessionResponse = response
            .json()
            .await
            .map_err(|e| BillingError::ParseError(format!("checkout session response: {e}")))?;

        Ok(CheckoutRedirect {
            session_id: body.id,
            url: body.url,
        })
    }
}
