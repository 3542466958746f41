//! Processed-event retention.
//!
//! The idempotency store only ever gains records as events arrive, so a
//! background sweep bounds it: records older than the retention window are
//! purged. The window is orders of magnitude larger than the verifier's
//! replay window, so purged events can never be replayed successfully.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::billing::BillingError;
use crate::domain::foundation::Timestamp;
use crate::ports::ProcessedEventStore;

pub struct RetentionSweeper {
    processed: Arc<dyn ProcessedEventStore>,
    max_age_days: i64,
}

impl RetentionSweeper {
    pub fn new(processed: Arc<dyn ProcessedEventStore>, max_age_days: i64) -> Self {
        Self {
            processed,
            max_age_days,
        }
    }

    /// Purges records older than the retention window once.
    pub async fn sweep(&self) -> Result<u64, BillingError> {
        let cutoff = Timestamp::now().minus_days(self.max_age_days);
        let purged = self.processed.purge_before(cutoff).await?;
        if purged > 0 {
            tracing::info!(purged, %cutoff, "purged processed-event records past retention");
        }
        Ok(purged)
    }

    /// Sweeps on a fixed interval until the task is dropped. A failed
    /// sweep is logged and retried on the next tick.
    pub async fn run(self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(err) = self.sweep().await {
                tracing::error!(error = %err, "retention sweep failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryProcessedEventStore;
    use crate::ports::ProcessedEvent;

    fn record(event_id: &str, processed_at: Timestamp) -> ProcessedEvent {
        ProcessedEvent {
            event_id: event_id.to_string(),
            event_type: "customer.subscription.updated".to_string(),
            outcome: "applied".to_string(),
            processed_at,
        }
    }

    #[tokio::test]
    async fn sweep_bounds_the_store_to_the_retention_window() {
        let store = Arc::new(InMemoryProcessedEventStore::new());
        store
            .insert_if_absent(record("evt_old", Timestamp::now().minus_days(31)))
            .await
            .unwrap();
        store
            .insert_if_absent(record("evt_recent", Timestamp::now().minus_days(1)))
            .await
            .unwrap();
        let sweeper = RetentionSweeper::new(store.clone(), 30);

        let purged = sweeper.sweep().await.unwrap();

        assert_eq!(purged, 1);
        assert!(!store.contains("evt_old").await.unwrap());
        assert!(store.contains("evt_recent").await.unwrap());
    }

    #[tokio::test]
    async fn sweep_on_an_empty_window_purges_nothing() {
        let store = Arc::new(InMemoryProcessedEventStore::new());
        store
            .insert_if_absent(record("evt_1", Timestamp::now()))
            .await
            .unwrap();
        let sweeper = RetentionSweeper::new(store.clone(), 30);

        assert_eq!(sweeper.sweep().await.unwrap(), 0);
        assert!(store.contains("evt_1").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn run_purges_on_each_tick() {
        let store = Arc::new(InMemoryProcessedEventStore::new());
        store
            .insert_if_absent(record("evt_old", Timestamp::now().minus_days(31)))
            .await
            .unwrap();
        let sweeper = RetentionSweeper::new(store.clone(), 30);

        let handle = tokio::spawn(sweeper.run(Duration::from_secs(60)));

        // The first tick fires immediately.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!store.contains("evt_old").await.unwrap());
        handle.abort();
    }
}
