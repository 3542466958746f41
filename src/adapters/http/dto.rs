//! HTTP request/response bodies.

use serde::{Deserialize, Serialize};

use crate::application::handlers::billing::ProcessOutcome;

/// Acknowledgment body returned for every accepted webhook delivery.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    pub outcome: &'static str,
}

impl From<&ProcessOutcome> for WebhookAck {
    fn from(outcome: &ProcessOutcome) -> Self {
        Self {
            received: true,
            outcome: outcome.as_str(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StartCheckoutRequest {
    pub account_id: String,
    pub price_id: String,
    pub plan: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Serialize)]
pub struct StartCheckoutResponse {
    pub session_id: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
