//! Normalized billing facts.
//!
//! Classification turns a raw provider event into one of three things: a
//! [`BillingFact`] carrying everything the reconciler needs, an
//! informational acknowledgment, or an explicit "unhandled" marker. After
//! classification nothing downstream looks at the raw payload again.

use std::collections::HashMap;

use crate::domain::foundation::AccountId;

use super::entity_kind::EntityKind;
use super::provider_event::ProviderEventType;
use super::status::ProviderStatus;

/// Correlation metadata stamped onto checkout sessions and subscriptions
/// at checkout initiation, and read back from webhook events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationMetadata {
    pub account_id: AccountId,
    pub entity_kind: EntityKind,
    pub plan: Option<String>,
}

impl CorrelationMetadata {
    const ACCOUNT_ID_KEY: &'static str = "account_id";
    const ENTITY_KIND_KEY: &'static str = "entity_kind";
    const PLAN_KEY: &'static str = "plan";

    /// Reads correlation out of a provider metadata map. Returns `None`
    /// when either required key is absent or unparseable.
    pub fn from_metadata(metadata: &HashMap<String, String>) -> Option<Self> {
        let account_id = metadata
            .get(Self::ACCOUNT_ID_KEY)
            .and_then(|raw| AccountId::parse(raw).ok())?;
        let entity_kind = metadata
            .get(Self::ENTITY_KIND_KEY)
            .and_then(|raw| EntityKind::parse(raw))?;
        Some(Self {
            account_id,
            entity_kind,
            plan: metadata.get(Self::PLAN_KEY).cloned(),
        })
    }

    /// Renders the metadata map sent to the provider at checkout creation.
    pub fn to_metadata(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(Self::ACCOUNT_ID_KEY.to_string(), self.account_id.to_string());
        map.insert(
            Self::ENTITY_KIND_KEY.to_string(),
            self.entity_kind.as_str().to_string(),
        );
        if let Some(plan) = &self.plan {
            map.insert(Self::PLAN_KEY.to_string(), plan.clone());
        }
        map
    }
}

/// A fully normalized, actionable billing event.
#[derive(Debug, Clone)]
pub struct BillingFact {
    pub event_id: String,
    pub event_type: ProviderEventType,
    pub entity_kind: EntityKind,
    pub subscription_id: String,
    pub customer_id: String,
    pub provider_status: ProviderStatus,

    /// Provider-reported end of the current billing period (Unix seconds).
    pub period_end: Option<i64>,

    /// Present when the provider metadata carried correlation; always
    /// present for checkout facts.
    pub correlation: Option<CorrelationMetadata>,

    /// Provider-assigned creation timestamp of the event (Unix seconds).
    /// Ordering key for the reconciler's conditional write.
    pub occurred_at: i64,
}

impl BillingFact {
    /// True for facts that originate from a completed checkout, where the
    /// account association may need bootstrapping.
    pub fn is_checkout(&self) -> bool {
        self.event_type == ProviderEventType::CheckoutCompleted
    }
}

/// Outcome of classifying a raw provider event.
#[derive(Debug, Clone)]
pub enum Classification {
    /// Actionable; proceed to resolution and reconciliation.
    Fact(BillingFact),

    /// Recognized but carries no state change (e.g. invoice.paid).
    Informational { reason: &'static str },

    /// Event type outside the handled set. Acknowledged and logged.
    Unhandled { event_type: String },
}
