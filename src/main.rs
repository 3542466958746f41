use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use billsync::adapters::http::{billing_routes, BillingAppState};
use billsync::adapters::memory::{InMemoryAccountStore, InMemoryProcessedEventStore};
use billsync::adapters::provider::StripeProviderClient;
use billsync::application::handlers::billing::{
    AccountResolver, EventClassifier, Reconciler, RetentionSweeper, StartCheckoutHandler,
    WebhookPipeline,
};
use billsync::config::AppConfig;
use billsync::domain::billing::{EntityKind, WebhookVerifier};
use billsync::ports::{AccountStore, ProcessedEventStore, ProviderClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;

    let accounts: Arc<dyn AccountStore> = Arc::new(InMemoryAccountStore::new());
    let processed: Arc<dyn ProcessedEventStore> = Arc::new(InMemoryProcessedEventStore::new());
    let provider: Arc<dyn ProviderClient> = Arc::new(StripeProviderClient::new(
        config.provider.api_key.clone(),
        config.provider.base_url.clone(),
        config.provider.fetch_timeout(),
    ));

    let build_pipeline = |kind: EntityKind, secret| {
        Arc::new(WebhookPipeline::new(
            kind,
            WebhookVerifier::new(secret),
            EventClassifier::new(provider.clone()),
            AccountResolver::new(accounts.clone()),
            Reconciler::new(accounts.clone(), processed.clone()),
            processed.clone(),
        ))
    };

    let state = BillingAppState {
        individual_pipeline: build_pipeline(
            EntityKind::Individual,
            config.billing.individual_webhook_secret.clone(),
        ),
        corporate_pipeline: build_pipeline(
            EntityKind::Corporate,
            config.billing.corporate_webhook_secret.clone(),
        ),
        checkout: Arc::new(StartCheckoutHandler::new(
            accounts.clone(),
            provider.clone(),
        )),
    };

    let sweeper = RetentionSweeper::new(
        processed.clone(),
        config.billing.processed_event_retention_days,
    );
    tokio::spawn(sweeper.run(std::time::Duration::from_secs(
        config.billing.purge_interval_secs,
    )));

    let app = billing_routes(state).layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, "starting billing webhook service");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
