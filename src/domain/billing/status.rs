//! Subscription state vocabularies.
//!
//! Two distinct vocabularies live here: the provider's wire statuses (a
//! closed set, with a catch-all for vocabulary drift) and the domain's own
//! subscription state stored on the account record.

use serde::{Deserialize, Serialize};

/// Domain subscription state stored on a billing account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    /// No subscription has ever been decided for this account.
    None,

    /// Fully paid (or trialing) subscription.
    Active,

    /// Payment failed but within the grace period; paid access retained.
    PastDue,

    /// Subscription ended by deletion or cancellation.
    Canceled,

    /// Payment retries exhausted.
    Unpaid,
}

impl SubscriptionState {
    /// Returns true if this state grants paid feature access.
    pub fn grants_access(&self) -> bool {
        matches!(self, SubscriptionState::Active | SubscriptionState::PastDue)
    }
}

/// Subscription status as reported by the payment provider.
///
/// The known set is closed; anything outside it parses to [`Unknown`]
/// so a provider-side vocabulary change degrades to a logged no-op instead
/// of breaking ingestion.
///
/// [`Unknown`]: ProviderStatus::Unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Unpaid,
    Incomplete,
    IncompleteExpired,
    /// Status outside the closed set.
    Unknown,
}

impl ProviderStatus {
    /// All statuses in the closed provider vocabulary.
    pub const KNOWN: [ProviderStatus; 7] = [
        ProviderStatus::Active,
        ProviderStatus::Trialing,
        ProviderStatus::PastDue,
        ProviderStatus::Canceled,
        ProviderStatus::Unpaid,
        ProviderStatus::Incomplete,
        ProviderStatus::IncompleteExpired,
    ];

    /// Parses a provider status string. Unknown values are never an error.
    pub fn parse(s: &str) -> Self {
        match s {
            "active" => ProviderStatus::Active,
            "trialing" => ProviderStatus::Trialing,
            "past_due" => ProviderStatus::PastDue,
            "canceled" => ProviderStatus::Canceled,
            "unpaid" => ProviderStatus::Unpaid,
            "incomplete" => ProviderStatus::Incomplete,
            "incomplete_expired" => ProviderStatus::IncompleteExpired,
            _ => ProviderStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderStatus::Active => "active",
            ProviderStatus::Trialing => "trialing",
            ProviderStatus::PastDue => "past_due",
            ProviderStatus::Canceled => "canceled",
            ProviderStatus::Unpaid => "unpaid",
            ProviderStatus::Incomplete => "incomplete",
            ProviderStatus::IncompleteExpired => "incomplete_expired",
            ProviderStatus::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ProviderStatus::Unknown)
    }
}
