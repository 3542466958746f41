//! Billing pipeline error type.
//!
//! One error family for the whole pipeline, with HTTP status mapping and
//! retryability semantics. The status code drives the provider's redelivery
//! behavior: 2xx acknowledges, 4xx stops retries, 5xx triggers redelivery
//! with backoff.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur while authenticating or processing a billing event.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Signature header absent from the request.
    #[error("Missing signature header")]
    MissingSignature,

    /// Signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Event timestamp outside the replay-protection window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// No webhook secret configured for this integration; the endpoint
    /// fails closed.
    #[error("Webhook secret not configured")]
    SecretNotConfigured,

    /// Failed to parse the signature header or the JSON payload.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from the event payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Referenced account does not exist (checkout initiation only;
    /// unresolvable webhook events are acknowledged, not errored).
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// The authoritative re-fetch or another provider call failed or
    /// timed out.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Account or idempotency store operation failed.
    #[error("Store error: {0}")]
    Store(String),
}

impl BillingError {
    /// Returns true if the provider should redeliver after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BillingError::ProviderUnavailable(_) | BillingError::Store(_)
        )
    }

    /// Maps the error to the HTTP status returned to the provider.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Auth failures - not helped by retry
            BillingError::MissingSignature => StatusCode::BAD_REQUEST,
            BillingError::InvalidSignature
            | BillingError::TimestampOutOfRange
            | BillingError::SecretNotConfigured => StatusCode::UNAUTHORIZED,

            // Malformed input - not helped by retry
            BillingError::ParseError(_) | BillingError::MissingField(_) => {
                StatusCode::BAD_REQUEST
            }

            BillingError::AccountNotFound(_) => StatusCode::NOT_FOUND,

            // Transient - provider redelivers with backoff
            BillingError::ProviderUnavailable(_) | BillingError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
