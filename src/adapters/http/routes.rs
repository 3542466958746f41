//! Route table.

use axum::routing::post;
use axum::Router;

use super::handlers::{self, BillingAppState};

pub fn billing_routes(state: BillingAppState) -> Router {
    Router::new()
        .route(
            "/api/webhooks/individual",
            post(handlers::individual_webhook),
        )
        .route(
            "/api/webhooks/corporate",
            post(handlers::corporate_webhook),
        )
        .route("/api/billing/checkout", post(handlers::start_checkout))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAccountStore, InMemoryProcessedEventStore};
    use crate::application::handlers::billing::{
        AccountResolver, EventClassifier, Reconciler, StartCheckoutHandler, WebhookPipeline,
    };
    use crate::domain::billing::{BillingError, EntityKind, WebhookVerifier};
    use crate::ports::{
        CheckoutRedirect, CheckoutSessionRequest, ProviderClient, ProviderSubscription,
    };
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use secrecy::SecretString;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct NoProvider;

    #[async_trait]
    impl ProviderClient for NoProvider {
        async fn get_subscription(
            &self,
            subscription_id: &str,
        ) -> Result<ProviderSubscription, BillingError> {
            Err(BillingError::ProviderUnavailable(subscription_id.into()))
        }

        async fn create_checkout_session(
            &self,
            _request: &CheckoutSessionRequest,
        ) -> Result<CheckoutRedirect, BillingError> {
            Err(BillingError::ProviderUnavailable("offline".into()))
        }
    }

    fn pipeline(kind: EntityKind, secret: Option<SecretString>) -> Arc<WebhookPipeline> {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let processed = Arc::new(InMemoryProcessedEventStore::new());
        let provider: Arc<dyn ProviderClient> = Arc::new(NoProvider);
        Arc::new(WebhookPipeline::new(
            kind,
            WebhookVerifier::new(secret),
            EventClassifier::new(provider),
            AccountResolver::new(accounts.clone()),
            Reconciler::new(accounts, processed.clone()),
            processed,
        ))
    }

    fn router(secret: Option<SecretString>) -> Router {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let state = BillingAppState {
            individual_pipeline: pipeline(EntityKind::Individual, secret.clone()),
            corporate_pipeline: pipeline(EntityKind::Corporate, secret),
            checkout: Arc::new(StartCheckoutHandler::new(accounts, Arc::new(NoProvider))),
        };
        billing_routes(state)
    }

    #[tokio::test]
    async fn unsigned_webhook_is_rejected() {
        let app = router(Some(SecretString::new("whsec_test".to_string())));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/webhooks/individual")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn garbage_signature_is_unauthorized() {
        let app = router(Some(SecretString::new("whsec_test".to_string())));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/webhooks/corporate")
                    .header("Stripe-Signature", "t=1,v1=deadbeef")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unconfigured_secret_fails_closed() {
        let app = router(None);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/webhooks/individual")
                    .header("Stripe-Signature", "t=1,v1=00")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn checkout_with_malformed_account_id_is_bad_request() {
        let app = router(Some(SecretString::new("whsec_test".to_string())));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/billing/checkout")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{
                            "account_id": "not-a-uuid",
                            "price_id": "price_1",
                            "success_url": "https://app.example/s",
                            "cancel_url": "https://app.example/c"
                        }"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn checkout_for_unknown_account_is_not_found() {
        let app = router(Some(SecretString::new("whsec_test".to_string())));
        let body = format!(
            r#"{{
                "account_id": "{}",
                "price_id": "price_1",
                "success_url": "https://app.example/s",
                "cancel_url": "https://app.example/c"
            }}"#,
            crate::domain::foundation::AccountId::new()
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/billing/checkout")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
