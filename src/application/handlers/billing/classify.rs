//! Event classification.
//!
//! Turns an authenticated provider event into a normalized billing fact,
//! an informational acknowledgment, or an unhandled marker. Checkout
//! completions are never trusted as-is: the referenced subscription is
//! re-fetched from the provider so the applied status is authoritative.

use std::sync::Arc;

use crate::domain::billing::provider_event::{
    CheckoutSessionObject, ProviderEvent, ProviderEventType, SubscriptionObject,
};
use crate::domain::billing::{
    BillingError, BillingFact, Classification, CorrelationMetadata, EntityKind, ProviderStatus,
};
use crate::ports::ProviderClient;

pub struct EventClassifier {
    provider: Arc<dyn ProviderClient>,
}

impl EventClassifier {
    pub fn new(provider: Arc<dyn ProviderClient>) -> Self {
        Self { provider }
    }

    /// Classifies an event for the given integration path.
    pub async fn classify(
        &self,
        entity_kind: EntityKind,
        event: &ProviderEvent,
    ) -> Result<Classification, BillingError> {
        match event.parsed_type() {
            ProviderEventType::CheckoutCompleted => {
                self.classify_checkout(entity_kind, event).await
            }
            event_type @ (ProviderEventType::SubscriptionCreated
            | ProviderEventType::SubscriptionUpdated
            | ProviderEventType::SubscriptionDeleted) => {
                self.classify_subscription(entity_kind, event, event_type)
            }
            ProviderEventType::InvoicePaymentFailed => {
                self.classify_invoice_failure(entity_kind, event)
            }
            ProviderEventType::InvoicePaid => Ok(Classification::Informational {
                reason: "invoice paid; renewal status arrives via subscription update",
            }),
            ProviderEventType::Unknown => {
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    "ignoring unhandled event type"
                );
                Ok(Classification::Unhandled {
                    event_type: event.event_type.clone(),
                })
            }
        }
    }

    async fn classify_checkout(
        &self,
        entity_kind: EntityKind,
        event: &ProviderEvent,
    ) -> Result<Classification, BillingError> {
        let session: CheckoutSessionObject = event
            .deserialize_object()
            .map_err(|e| BillingError::ParseError(format!("checkout session object: {e}")))?;

        // Correlation is stamped at checkout initiation; a session without
        // it did not originate from this system. Acknowledged so the
        // provider stops redelivering.
        let Some(correlation) = CorrelationMetadata::from_metadata(&session.metadata) else {
            tracing::warn!(
                event_id = %event.id,
                session_id = %session.id,
                "checkout session without correlation metadata; ignoring"
            );
            return Ok(Classification::Informational {
                reason: "checkout session without correlation metadata",
            });
        };

        let subscription_id = session
            .subscription
            .ok_or(BillingError::MissingField("subscription"))?;

        // The session snapshot may already be behind; fetch the live state.
        let subscription = self.provider.get_subscription(&subscription_id).await?;
        let status = ProviderStatus::parse(&subscription.status);
        if !status.is_known() {
            tracing::warn!(
                event_id = %event.id,
                subscription_id = %subscription.id,
                status = %subscription.status,
                "unknown subscription status from provider"
            );
        }

        Ok(Classification::Fact(BillingFact {
            event_id: event.id.clone(),
            event_type: ProviderEventType::CheckoutCompleted,
            entity_kind,
            subscription_id: subscription.id,
            customer_id: subscription.customer_id,
            provider_status: status,
            period_end: subscription.current_period_end,
            correlation: Some(correlation),
            occurred_at: event.created,
        }))
    }

    fn classify_subscription(
        &self,
        entity_kind: EntityKind,
        event: &ProviderEvent,
        event_type: ProviderEventType,
    ) -> Result<Classification, BillingError> {
        let subscription: SubscriptionObject = event
            .deserialize_object()
            .map_err(|e| BillingError::ParseError(format!("subscription object: {e}")))?;

        // Deletion is authoritative regardless of the payload's last status.
        let status = if event_type == ProviderEventType::SubscriptionDeleted {
            ProviderStatus::Canceled
        } else {
            let status = ProviderStatus::parse(&subscription.status);
            if !status.is_known() {
                tracing::warn!(
                    event_id = %event.id,
                    subscription_id = %subscription.id,
                    status = %subscription.status,
                    "unknown subscription status in event"
                );
            }
            status
        };

        Ok(Classification::Fact(BillingFact {
            event_id: event.id.clone(),
            event_type,
            entity_kind,
            subscription_id: subscription.id,
            customer_id: subscription.customer,
            provider_status: status,
            period_end: subscription.current_period_end,
            correlation: CorrelationMetadata::from_metadata(&subscription.metadata),
            occurred_at: event.created,
        }))
    }

    /// A failed invoice payment signals past_due. The subscription update
    /// carrying the same transition usually arrives too, so this is a
    /// belt-and-braces path kept cheap: no provider re-fetch.
    fn classify_invoice_failure(
        &self,
        entity_kind: EntityKind,
        event: &ProviderEvent,
    ) -> Result<Classification, BillingError> {
        use crate::domain::billing::provider_event::InvoiceObject;

        let invoice: InvoiceObject = event
            .deserialize_object()
            .map_err(|e| BillingError::ParseError(format!("invoice object: {e}")))?;

        let Some(subscription_id) = invoice.subscription else {
            // One-off invoices carry no subscription; nothing to reconcile.
            return Ok(Classification::Informational {
                reason: "invoice payment failure without a subscription",
            });
        };
        let Some(customer_id) = invoice.customer else {
            return Ok(Classification::Informational {
                reason: "invoice payment failure without a customer",
            });
        };

        Ok(Classification::Fact(BillingFact {
            event_id: event.id.clone(),
            event_type: ProviderEventType::InvoicePaymentFailed,
            entity_kind,
            subscription_id,
            customer_id,
            provider_status: ProviderStatus::PastDue,
            period_end: None,
            correlation: None,
            occurred_at: event.created,
        }))
    }
}
