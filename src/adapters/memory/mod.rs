//! In-memory adapter implementations for the persistence ports.

pub mod account_store;
pub mod processed_events;

pub use account_store::InMemoryAccountStore;
pub use processed_events::InMemoryProcessedEventStore;
