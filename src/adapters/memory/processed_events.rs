//! In-memory processed-event store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::billing::BillingError;
use crate::domain::foundation::Timestamp;
use crate::ports::{InsertOutcome, ProcessedEvent, ProcessedEventStore};

#[derive(Default)]
pub struct InMemoryProcessedEventStore {
    events: RwLock<HashMap<String, ProcessedEvent>>,
}

impl InMemoryProcessedEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProcessedEventStore for InMemoryProcessedEventStore {
    async fn contains(&self, event_id: &str) -> Result<bool, BillingError> {
        Ok(self.events.read().await.contains_key(event_id))
    }

    async fn insert_if_absent(
        &self,
        event: ProcessedEvent,
    ) -> Result<InsertOutcome, BillingError> {
        let mut events = self.events.write().await;
        if events.contains_key(&event.event_id) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        events.insert(event.event_id.clone(), event);
        Ok(InsertOutcome::Inserted)
    }

    async fn purge_before(&self, cutoff: Timestamp) -> Result<u64, BillingError> {
        let mut events = self.events.write().await;
        let before = events.len();
        events.retain(|_, e| !cutoff.is_after(&e.processed_at));
        Ok((before - events.len()) as u64)
    }
}
