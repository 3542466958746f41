//! Status mapper: provider vocabulary to domain state and tier effect.
//!
//! A pure function with no knowledge of the account's current state. The
//! mapping table is identical for both entity kinds; only the paid-tier
//! vocabulary differs, and that resolves through [`EntityKind::paid_tier`].
//! Guards that depend on current account state (monotonicity, cross-path)
//! belong to the reconciler, not here.

use super::entity_kind::{EntityKind, MembershipTier};
use super::status::{ProviderStatus, SubscriptionState};

/// Effect of a mapped status on the account's membership tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierEffect {
    /// Grant the paid tier for the pipeline's entity kind.
    GrantPaid,

    /// Keep whatever tier the account currently has (grace period).
    RetainPaid,

    /// Downgrade to the free tier.
    RevokeToFree,

    /// Leave tier and status untouched.
    NoOp,
}

impl TierEffect {
    /// Resolves the effect against a current tier.
    pub fn apply(&self, kind: EntityKind, current: MembershipTier) -> MembershipTier {
        match self {
            TierEffect::GrantPaid => kind.paid_tier(),
            TierEffect::RetainPaid => current,
            TierEffect::RevokeToFree => MembershipTier::Free,
            TierEffect::NoOp => current,
        }
    }
}

/// Result of mapping a provider status for one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMapping {
    pub state: SubscriptionState,
    pub tier_effect: TierEffect,
}

/// Maps a provider status to the domain state and tier effect.
///
/// Total over the full [`ProviderStatus`] set, including `Unknown`:
/// incomplete, incomplete_expired and unknown statuses all map to a no-op
/// so that a failed or unrecognized subscription attempt never clobbers a
/// previously decided state.
pub fn map_status(kind: EntityKind, status: ProviderStatus) -> StatusMapping {
    let _ = kind; // table is kind-independent; the tier vocabulary is not
    match status {
        ProviderStatus::Active | ProviderStatus::Trialing => StatusMapping {
            state: SubscriptionState::Active,
            tier_effect: TierEffect::GrantPaid,
        },
        ProviderStatus::PastDue => StatusMapping {
            state: SubscriptionState::PastDue,
            tier_effect: TierEffect::RetainPaid,
        },
        ProviderStatus::Canceled => StatusMapping {
            state: SubscriptionState::Canceled,
            tier_effect: TierEffect::RevokeToFree,
        },
        ProviderStatus::Unpaid => StatusMapping {
            state: SubscriptionState::Unpaid,
            tier_effect: TierEffect::RevokeToFree,
        },
        ProviderStatus::Incomplete
        | ProviderStatus::IncompleteExpired
        | ProviderStatus::Unknown => StatusMapping {
            state: SubscriptionState::None,
            tier_effect: TierEffect::NoOp,
        },
    }
}
