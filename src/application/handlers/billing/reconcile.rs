//! Reconciliation: applying a billing fact to a resolved account.
//!
//! Order of the guards matters and is load-bearing:
//! 1. cross-path: never mutate an account the other integration path owns;
//! 2. no-op statuses: incomplete/unknown never overwrite decided state;
//! 3. staleness: the conditional write rejects events at or before the
//!    stored last-applied timestamp.
//!
//! Idempotency records are written only for terminal outcomes (applied,
//! no-op, stale). Transient failures leave no record, so the provider's
//! redelivery gets a clean run.

use std::sync::Arc;

use crate::domain::billing::{
    map_status, BillingAccount, BillingError, BillingFact, MembershipTier, SubscriptionState,
    TierEffect,
};
use crate::domain::foundation::Timestamp;
use crate::ports::{AccountStore, ProcessedEvent, ProcessedEventStore, WriteOutcome};

/// Terminal outcome of reconciling one fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The account was updated.
    Applied {
        state: SubscriptionState,
        tier: MembershipTier,
    },

    /// Another delivery of this event already completed.
    AlreadyProcessed,

    /// The status deliberately does not change account state.
    NoOp { reason: &'static str },

    /// The account belongs to the other integration path; left untouched.
    CrossPathSkipped,

    /// An event with a later timestamp was already applied.
    Stale,
}

impl ReconcileOutcome {
    /// Label stored in the idempotency record.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileOutcome::Applied { .. } => "applied",
            ReconcileOutcome::AlreadyProcessed => "already_processed",
            ReconcileOutcome::NoOp { .. } => "no_op",
            ReconcileOutcome::CrossPathSkipped => "cross_path_skipped",
            ReconcileOutcome::Stale => "stale",
        }
    }
}

pub struct Reconciler {
    accounts: Arc<dyn AccountStore>,
    processed: Arc<dyn ProcessedEventStore>,
}

impl Reconciler {
    pub fn new(accounts: Arc<dyn AccountStore>, processed: Arc<dyn ProcessedEventStore>) -> Self {
        Self {
            accounts,
            processed,
        }
    }

    pub async fn reconcile(
        &self,
        mut account: BillingAccount,
        fact: &BillingFact,
    ) -> Result<ReconcileOutcome, BillingError> {
        // An account holding the other path's paid tier is owned by that
        // path. Tier-based, not kind-based: a record whose kind was
        // migrated still gets protected.
        let other_paid_tier_held =
            account.tier.is_paid() && account.tier != fact.entity_kind.paid_tier();
        if other_paid_tier_held {
            tracing::warn!(
                account_id = %account.id,
                account_tier = %account.tier.display_name(),
                path = %fact.entity_kind.as_str(),
                event_id = %fact.event_id,
                "cross-path event targets an account owned by the other path"
            );
            return self.record(fact, ReconcileOutcome::CrossPathSkipped).await;
        }

        let mapping = map_status(fact.entity_kind, fact.provider_status);
        if mapping.tier_effect == TierEffect::NoOp {
            let reason = if fact.provider_status.is_known() {
                "incomplete status never overwrites decided state"
            } else {
                "unknown provider status"
            };
            tracing::info!(
                account_id = %account.id,
                event_id = %fact.event_id,
                status = %fact.provider_status.as_str(),
                reason,
                "status maps to no-op"
            );
            return self.record(fact, ReconcileOutcome::NoOp { reason }).await;
        }

        // Keep provider identifiers fresh on the account record. A
        // re-subscription arrives under a new subscription id; the applied
        // write must replace the old one or the persisted surface keeps
        // pointing at a dead subscription.
        if account.customer_id.as_deref() != Some(fact.customer_id.as_str()) {
            account.customer_id = Some(fact.customer_id.clone());
        }
        if account.subscription_id.as_deref() != Some(fact.subscription_id.as_str()) {
            account.subscription_id = Some(fact.subscription_id.clone());
        }

        let period_end = fact.period_end.map(Timestamp::from_unix_secs);
        account.apply_mapping(&mapping, period_end, fact.occurred_at);

        match self
            .accounts
            .update_if_newer(&account, fact.occurred_at)
            .await?
        {
            WriteOutcome::Applied => {
                tracing::info!(
                    account_id = %account.id,
                    event_id = %fact.event_id,
                    state = ?account.state,
                    tier = %account.tier.display_name(),
                    "account reconciled"
                );
                self.record(
                    fact,
                    ReconcileOutcome::Applied {
                        state: account.state,
                        tier: account.tier,
                    },
                )
                .await
            }
            WriteOutcome::Stale => {
                tracing::info!(
                    account_id = %account.id,
                    event_id = %fact.event_id,
                    event_at = fact.occurred_at,
                    "out-of-order event discarded"
                );
                self.record(fact, ReconcileOutcome::Stale).await
            }
        }
    }

    /// Writes the idempotency record for a terminal outcome. A concurrent
    /// delivery may have won the race; its outcome stands.
    async fn record(
        &self,
        fact: &BillingFact,
        outcome: ReconcileOutcome,
    ) -> Result<ReconcileOutcome, BillingError> {
        use crate::ports::InsertOutcome;

        let record = ProcessedEvent {
            event_id: fact.event_id.clone(),
            event_type: fact.event_type.as_str().to_string(),
            outcome: outcome.as_str().to_string(),
            processed_at: Timestamp::now(),
        };
        match self.processed.insert_if_absent(record).await? {
            InsertOutcome::Inserted => Ok(outcome),
            InsertOutcome::AlreadyExists => Ok(ReconcileOutcome::AlreadyProcessed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAccountStore, InMemoryProcessedEventStore};
    use crate::domain::billing::provider_event::ProviderEventType;
    use crate::domain::billing::{EntityKind, ProviderStatus};
    use crate::domain::foundation::AccountId;

    struct Fixture {
        accounts: Arc<InMemoryAccountStore>,
        processed: Arc<InMemoryProcessedEventStore>,
        reconciler: Reconciler,
    }

    fn fixture() -> Fixture {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let processed = Arc::new(InMemoryProcessedEventStore::new());
        let reconciler = Reconciler::new(accounts.clone(), processed.clone());
        Fixture {
            accounts,
            processed,
            reconciler,
        }
    }

    fn fact(
        event_id: &str,
        kind: EntityKind,
        status: ProviderStatus,
        occurred_at: i64,
    ) -> BillingFact {
        BillingFact {
            event_id: event_id.to_string(),
            event_type: ProviderEventType::SubscriptionUpdated,
            entity_kind: kind,
            subscription_id: "sub_1".to_string(),
            customer_id: "cus_1".to_string(),
            provider_status: status,
            period_end: Some(1_720_000_000),
            correlation: None,
            occurred_at,
        }
    }

    async fn seeded_account(fx: &Fixture, kind: EntityKind) -> BillingAccount {
        let account = BillingAccount::new(AccountId::new(), kind);
        fx.accounts.insert(account.clone()).await.unwrap();
        account
    }

    #[tokio::test]
    async fn active_status_grants_paid_tier() {
        let fx = fixture();
        let account = seeded_account(&fx, EntityKind::Individual).await;

        let outcome = fx
            .reconciler
            .reconcile(
                account.clone(),
                &fact("evt_1", EntityKind::Individual, ProviderStatus::Active, 100),
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ReconcileOutcome::Applied {
                state: SubscriptionState::Active,
                tier: MembershipTier::Premium,
            }
        );
        let stored = fx.accounts.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(stored.tier, MembershipTier::Premium);
        assert_eq!(stored.subscription_id.as_deref(), Some("sub_1"));
        assert_eq!(stored.customer_id.as_deref(), Some("cus_1"));
        assert_eq!(stored.last_event_at, Some(100));
        assert!(fx.processed.contains("evt_1").await.unwrap());
    }

    #[tokio::test]
    async fn stale_event_is_discarded_and_recorded() {
        let fx = fixture();
        let account = seeded_account(&fx, EntityKind::Individual).await;
        fx.reconciler
            .reconcile(
                account.clone(),
                &fact("evt_2", EntityKind::Individual, ProviderStatus::Canceled, 200),
            )
            .await
            .unwrap();

        let current = fx.accounts.find_by_id(&account.id).await.unwrap().unwrap();
        let outcome = fx
            .reconciler
            .reconcile(
                current,
                &fact("evt_1", EntityKind::Individual, ProviderStatus::Active, 100),
            )
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::Stale);
        let stored = fx.accounts.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(stored.state, SubscriptionState::Canceled);
        assert_eq!(stored.tier, MembershipTier::Free);
        assert!(fx.processed.contains("evt_1").await.unwrap());
    }

    #[tokio::test]
    async fn equal_timestamp_is_stale() {
        let fx = fixture();
        let account = seeded_account(&fx, EntityKind::Individual).await;
        fx.reconciler
            .reconcile(
                account.clone(),
                &fact("evt_1", EntityKind::Individual, ProviderStatus::Active, 100),
            )
            .await
            .unwrap();

        let current = fx.accounts.find_by_id(&account.id).await.unwrap().unwrap();
        let outcome = fx
            .reconciler
            .reconcile(
                current,
                &fact("evt_2", EntityKind::Individual, ProviderStatus::Canceled, 100),
            )
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::Stale);
    }

    #[tokio::test]
    async fn incomplete_never_overwrites_decided_state() {
        let fx = fixture();
        let account = seeded_account(&fx, EntityKind::Corporate).await;
        fx.reconciler
            .reconcile(
                account.clone(),
                &fact("evt_1", EntityKind::Corporate, ProviderStatus::Active, 100),
            )
            .await
            .unwrap();

        let current = fx.accounts.find_by_id(&account.id).await.unwrap().unwrap();
        let outcome = fx
            .reconciler
            .reconcile(
                current,
                &fact("evt_2", EntityKind::Corporate, ProviderStatus::Incomplete, 200),
            )
            .await
            .unwrap();

        assert!(matches!(outcome, ReconcileOutcome::NoOp { .. }));
        let stored = fx.accounts.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(stored.state, SubscriptionState::Active);
        assert_eq!(stored.tier, MembershipTier::Corporate);
        // The no-op is terminal: redelivery short-circuits.
        assert!(fx.processed.contains("evt_2").await.unwrap());
    }

    #[tokio::test]
    async fn cross_path_event_leaves_account_untouched() {
        let fx = fixture();
        let account = seeded_account(&fx, EntityKind::Corporate).await;
        fx.reconciler
            .reconcile(
                account.clone(),
                &fact("evt_1", EntityKind::Corporate, ProviderStatus::Active, 100),
            )
            .await
            .unwrap();

        // An individual-path event arrives for the corporate account.
        let current = fx.accounts.find_by_id(&account.id).await.unwrap().unwrap();
        let outcome = fx
            .reconciler
            .reconcile(
                current,
                &fact("evt_2", EntityKind::Individual, ProviderStatus::Canceled, 200),
            )
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::CrossPathSkipped);
        let stored = fx.accounts.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(stored.tier, MembershipTier::Corporate);
        assert_eq!(stored.state, SubscriptionState::Active);
    }

    #[tokio::test]
    async fn free_account_is_not_cross_path_protected() {
        let fx = fixture();
        let account = seeded_account(&fx, EntityKind::Corporate).await;

        // No paid tier held, so either path may decide the account.
        let outcome = fx
            .reconciler
            .reconcile(
                account.clone(),
                &fact("evt_1", EntityKind::Individual, ProviderStatus::Active, 100),
            )
            .await
            .unwrap();

        assert!(matches!(outcome, ReconcileOutcome::Applied { .. }));
    }

    #[tokio::test]
    async fn duplicate_record_write_reports_already_processed() {
        let fx = fixture();
        let account = seeded_account(&fx, EntityKind::Individual).await;
        let f = fact("evt_1", EntityKind::Individual, ProviderStatus::Active, 100);
        fx.reconciler.reconcile(account.clone(), &f).await.unwrap();

        let current = fx.accounts.find_by_id(&account.id).await.unwrap().unwrap();
        let outcome = fx.reconciler.reconcile(current, &f).await.unwrap();

        // Same event id: the insert loses the race it already ran.
        assert_eq!(outcome, ReconcileOutcome::AlreadyProcessed);
    }

    #[tokio::test]
    async fn resubscription_replaces_the_old_subscription_id() {
        let fx = fixture();
        let account = seeded_account(&fx, EntityKind::Individual).await;
        fx.reconciler
            .reconcile(
                account.clone(),
                &fact("evt_1", EntityKind::Individual, ProviderStatus::Active, 100),
            )
            .await
            .unwrap();
        let current = fx.accounts.find_by_id(&account.id).await.unwrap().unwrap();
        fx.reconciler
            .reconcile(
                current,
                &fact("evt_2", EntityKind::Individual, ProviderStatus::Canceled, 200),
            )
            .await
            .unwrap();

        // Re-subscribing creates a fresh subscription under the same
        // customer.
        let mut renewal = fact("evt_3", EntityKind::Individual, ProviderStatus::Active, 300);
        renewal.subscription_id = "sub_2".to_string();
        let current = fx.accounts.find_by_id(&account.id).await.unwrap().unwrap();
        let outcome = fx.reconciler.reconcile(current, &renewal).await.unwrap();

        assert!(matches!(outcome, ReconcileOutcome::Applied { .. }));
        let stored = fx.accounts.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(stored.subscription_id.as_deref(), Some("sub_2"));
        assert_eq!(stored.tier, MembershipTier::Premium);
    }

    #[tokio::test]
    async fn unpaid_revokes_to_free() {
        let fx = fixture();
        let account = seeded_account(&fx, EntityKind::Individual).await;
        fx.reconciler
            .reconcile(
                account.clone(),
                &fact("evt_1", EntityKind::Individual, ProviderStatus::Active, 100),
            )
            .await
            .unwrap();

        let current = fx.accounts.find_by_id(&account.id).await.unwrap().unwrap();
        let outcome = fx
            .reconciler
            .reconcile(
                current,
                &fact("evt_2", EntityKind::Individual, ProviderStatus::Unpaid, 200),
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ReconcileOutcome::Applied {
                state: SubscriptionState::Unpaid,
                tier: MembershipTier::Free,
            }
        );
    }
}
