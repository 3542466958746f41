//! Ports: async trait boundaries between the application core and the
//! outside world. Adapters implement these.

pub mod account_store;
pub mod processed_events;
pub mod provider_client;

pub use account_store::{AccountStore, WriteOutcome};
pub use processed_events::{InsertOutcome, ProcessedEvent, ProcessedEventStore};
pub use provider_client::{
    CheckoutRedirect, CheckoutSessionRequest, ProviderClient, ProviderSubscription,
};
