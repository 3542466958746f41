//! Processed-event (idempotency) store port.

use async_trait::async_trait;

use crate::domain::billing::BillingError;
use crate::domain::foundation::Timestamp;

/// Record of a webhook event that reached a terminal outcome.
///
/// Only successes and deliberate no-ops are recorded; transient failures
/// leave no record so the provider's redelivery can succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedEvent {
    pub event_id: String,
    pub event_type: String,
    pub outcome: String,
    pub processed_at: Timestamp,
}

/// Outcome of the set-if-absent insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

/// Idempotency store keyed by provider event id.
#[async_trait]
pub trait ProcessedEventStore: Send + Sync {
    async fn contains(&self, event_id: &str) -> Result<bool, BillingError>;

    /// Records the event id atomically. Concurrent deliveries of the same
    /// event race here; exactly one sees [`InsertOutcome::Inserted`].
    async fn insert_if_absent(&self, event: ProcessedEvent)
        -> Result<InsertOutcome, BillingError>;

    /// Removes records processed before the cutoff. Returns the number
    /// removed. Safe because the replay window is far shorter than any
    /// sensible retention.
    async fn purge_before(&self, cutoff: Timestamp) -> Result<u64, BillingError>;
}
