//! Webhook processing pipeline.
//!
//! One pipeline instance per integration path (individual, corporate),
//! each with its own verifier secret. The stages run strictly in order:
//! authenticate, idempotency check, classify, resolve, reconcile. Events
//! that cannot be matched to an account are acknowledged so the provider
//! stops redelivering; everything about them is logged first.

use std::sync::Arc;

use crate::domain::billing::{
    BillingError, Classification, EntityKind, MembershipTier, SubscriptionState, WebhookVerifier,
};
use crate::domain::foundation::Timestamp;
use crate::ports::{ProcessedEvent, ProcessedEventStore};

use super::classify::EventClassifier;
use super::reconcile::{ReconcileOutcome, Reconciler};
use super::resolve::{AccountResolver, Resolution};

/// Outcome reported to the HTTP layer; everything here maps to 2xx.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Applied {
        state: SubscriptionState,
        tier: MembershipTier,
    },
    AlreadyProcessed,
    Ignored { reason: String },
    Stale,
    CrossPathSkipped,
    Unresolvable,
}

impl ProcessOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessOutcome::Applied { .. } => "applied",
            ProcessOutcome::AlreadyProcessed => "already_processed",
            ProcessOutcome::Ignored { .. } => "ignored",
            ProcessOutcome::Stale => "stale",
            ProcessOutcome::CrossPathSkipped => "cross_path_skipped",
            ProcessOutcome::Unresolvable => "unresolvable",
        }
    }
}

pub struct WebhookPipeline {
    entity_kind: EntityKind,
    verifier: WebhookVerifier,
    classifier: EventClassifier,
    resolver: AccountResolver,
    reconciler: Reconciler,
    processed: Arc<dyn ProcessedEventStore>,
}

impl WebhookPipeline {
    pub fn new(
        entity_kind: EntityKind,
        verifier: WebhookVerifier,
        classifier: EventClassifier,
        resolver: AccountResolver,
        reconciler: Reconciler,
        processed: Arc<dyn ProcessedEventStore>,
    ) -> Self {
        Self {
            entity_kind,
            verifier,
            classifier,
            resolver,
            reconciler,
            processed,
        }
    }

    pub fn entity_kind(&self) -> EntityKind {
        self.entity_kind
    }

    /// Runs the full pipeline on a raw webhook delivery.
    ///
    /// Errors surface as HTTP 4xx/5xx; every `Ok` is an acknowledgment.
    pub async fn process(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<ProcessOutcome, BillingError> {
        let event = self.verifier.verify_and_parse(payload, signature_header)?;

        // Cheap short-circuit before any provider call. The authoritative
        // check is the set-if-absent write at reconciliation time.
        if self.processed.contains(&event.id).await? {
            tracing::info!(
                event_id = %event.id,
                event_type = %event.event_type,
                "redelivered event already processed"
            );
            return Ok(ProcessOutcome::AlreadyProcessed);
        }

        let fact = match self.classifier.classify(self.entity_kind, &event).await? {
            Classification::Fact(fact) => fact,
            Classification::Informational { reason } => {
                return self
                    .acknowledge_without_effect(&event.id, &event.event_type, reason)
                    .await;
            }
            Classification::Unhandled { event_type } => {
                return self
                    .acknowledge_without_effect(&event.id, &event_type, "unhandled event type")
                    .await;
            }
        };

        let account = match self.resolver.resolve(&fact).await? {
            Resolution::Found(account) | Resolution::Bootstrapped(account) => account,
            Resolution::NotFound => {
                tracing::error!(
                    event_id = %fact.event_id,
                    event_type = %fact.event_type.as_str(),
                    subscription_id = %fact.subscription_id,
                    customer_id = %fact.customer_id,
                    "event does not match any account; acknowledging"
                );
                self.record_terminal(&fact.event_id, fact.event_type.as_str(), "unresolvable")
                    .await?;
                return Ok(ProcessOutcome::Unresolvable);
            }
        };

        let outcome = self.reconciler.reconcile(account, &fact).await?;
        Ok(match outcome {
            ReconcileOutcome::Applied { state, tier } => ProcessOutcome::Applied { state, tier },
            ReconcileOutcome::AlreadyProcessed => ProcessOutcome::AlreadyProcessed,
            ReconcileOutcome::NoOp { reason } => ProcessOutcome::Ignored {
                reason: reason.to_string(),
            },
            ReconcileOutcome::CrossPathSkipped => ProcessOutcome::CrossPathSkipped,
            ReconcileOutcome::Stale => ProcessOutcome::Stale,
        })
    }

    async fn acknowledge_without_effect(
        &self,
        event_id: &str,
        event_type: &str,
        reason: &str,
    ) -> Result<ProcessOutcome, BillingError> {
        self.record_terminal(event_id, event_type, "ignored").await?;
        Ok(ProcessOutcome::Ignored {
            reason: reason.to_string(),
        })
    }

    async fn record_terminal(
        &self,
        event_id: &str,
        event_type: &str,
        outcome: &str,
    ) -> Result<(), BillingError> {
        self.processed
            .insert_if_absent(ProcessedEvent {
                event_id: event_id.to_string(),
                event_type: event_type.to_string(),
                outcome: outcome.to_string(),
                processed_at: Timestamp::now(),
            })
            .await?;
        Ok(())
    }
}
