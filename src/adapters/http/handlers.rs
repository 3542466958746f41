//! Webhook and checkout HTTP handlers.
//!
//! The webhook handlers take the raw body bytes, not an extracted JSON
//! type: signature verification must run over the exact bytes received.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};

use crate::application::handlers::billing::{
    StartCheckoutCommand, StartCheckoutHandler, WebhookPipeline,
};
use crate::domain::billing::BillingError;
use crate::domain::foundation::AccountId;

use super::dto::{ErrorResponse, StartCheckoutRequest, StartCheckoutResponse, WebhookAck};

const SIGNATURE_HEADER: &str = "Stripe-Signature";

#[derive(Clone)]
pub struct BillingAppState {
    pub individual_pipeline: Arc<WebhookPipeline>,
    pub corporate_pipeline: Arc<WebhookPipeline>,
    pub checkout: Arc<StartCheckoutHandler>,
}

pub async fn individual_webhook(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    run_pipeline(&state.individual_pipeline, &headers, &body).await
}

pub async fn corporate_webhook(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    run_pipeline(&state.corporate_pipeline, &headers, &body).await
}

async fn run_pipeline(pipeline: &WebhookPipeline, headers: &HeaderMap, body: &Bytes) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    match pipeline.process(body, signature).await {
        Ok(outcome) => {
            tracing::debug!(
                path = %pipeline.entity_kind().as_str(),
                outcome = outcome.as_str(),
                "webhook acknowledged"
            );
            (StatusCode::OK, Json(WebhookAck::from(&outcome))).into_response()
        }
        Err(err) => error_response(pipeline, err),
    }
}

fn error_response(pipeline: &WebhookPipeline, err: BillingError) -> Response {
    let status = err.status_code();
    if err.is_retryable() {
        tracing::error!(
            path = %pipeline.entity_kind().as_str(),
            error = %err,
            "webhook processing failed; provider will redeliver"
        );
    } else {
        tracing::warn!(
            path = %pipeline.entity_kind().as_str(),
            error = %err,
            "webhook rejected"
        );
    }
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

pub async fn start_checkout(
    State(state): State<BillingAppState>,
    Json(request): Json<StartCheckoutRequest>,
) -> Response {
    let account_id = match AccountId::parse(&request.account_id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "invalid account_id".to_string(),
                }),
            )
                .into_response();
        }
    };

    let command = StartCheckoutCommand {
        account_id,
        price_id: request.price_id,
        plan: request.plan,
        success_url: request.success_url,
        cancel_url: request.cancel_url,
    };

    match state.checkout.handle(command).await {
        Ok(redirect) => (
            StatusCode::OK,
            Json(StartCheckoutResponse {
                session_id: redirect.session_id,
                url: redirect.url,
            }),
        )
            .into_response(),
        Err(err) => (
            err.status_code(),
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
            .into_response(),
    }
}
