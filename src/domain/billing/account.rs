//! Billing account record.
//!
//! The persisted surface read by every feature that gates on membership
//! tier. Created at signup as NONE/FREE and mutated exclusively by the
//! reconciler; accounts are never deleted, only downgraded.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, Timestamp};

use super::entity_kind::{EntityKind, MembershipTier};
use super::mapper::StatusMapping;
use super::status::SubscriptionState;

/// A billing account: an individual subscriber or a corporate tenant.
///
/// Invariants (upheld by the reconciler together with the status mapper):
/// - a paid tier implies state Active or PastDue;
/// - state Canceled or Unpaid implies the free tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingAccount {
    pub id: AccountId,
    pub entity_kind: EntityKind,

    /// Provider customer id; absent until the first completed checkout.
    pub customer_id: Option<String>,

    /// Provider subscription id; absent until a subscription exists.
    pub subscription_id: Option<String>,

    pub state: SubscriptionState,
    pub tier: MembershipTier,

    /// End of the current billing period; cleared when state becomes Canceled.
    pub current_period_end: Option<Timestamp>,

    /// Provider-assigned timestamp of the last applied event. Ordering key
    /// for the conditional write: an event at or before this is stale.
    pub last_event_at: Option<i64>,
}

impl BillingAccount {
    /// Creates the signup-time record: no subscription, free tier.
    pub fn new(id: AccountId, entity_kind: EntityKind) -> Self {
        Self {
            id,
            entity_kind,
            customer_id: None,
            subscription_id: None,
            state: SubscriptionState::None,
            tier: MembershipTier::Free,
            current_period_end: None,
            last_event_at: None,
        }
    }

    /// Returns true if the account currently has paid feature access.
    pub fn has_access(&self) -> bool {
        self.state.grants_access() && self.tier.is_paid()
    }

    /// Applies a mapped status change in place.
    ///
    /// Period tracking follows the reconciler's rule: the period end is
    /// persisted alongside every non-Canceled change and cleared on
    /// Canceled. The caller is responsible for the no-op, cross-path and
    /// staleness guards; this method assumes the change was admitted.
    pub fn apply_mapping(
        &mut self,
        mapping: &StatusMapping,
        period_end: Option<Timestamp>,
        event_at: i64,
    ) {
        self.state = mapping.state;
        self.tier = mapping.tier_effect.apply(self.entity_kind, self.tier);
        self.current_period_end = if mapping.state == SubscriptionState::Canceled {
            None
        } else {
            period_end.or(self.current_period_end)
        };
        self.last_event_at = Some(event_at);
    }

    /// Checks the tier/state invariants. Used by tests and the in-memory
    /// store's debug assertions.
    pub fn is_consistent(&self) -> bool {
        if self.tier.is_paid()
            && !matches!(
                self.state,
                SubscriptionState::Active | SubscriptionState::PastDue
            )
        {
            return false;
        }
        if matches!(
            self.state,
            SubscriptionState::Canceled | SubscriptionState::Unpaid
        ) && self.tier.is_paid()
        {
            return false;
        }
        true
    }
}
