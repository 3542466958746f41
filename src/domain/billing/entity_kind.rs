//! Entity kinds and membership tiers.
//!
//! Individual subscribers and corporate tenants share one provider event
//! vocabulary; the only difference between the two pipelines is which paid
//! tier a grant resolves to. Keeping that lookup here is what lets the rest
//! of the pipeline stay generic over the kind.

use serde::{Deserialize, Serialize};

/// The kind of account addressed by an ingress endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// An individual subscriber.
    Individual,

    /// A corporate tenant.
    Corporate,
}

impl EntityKind {
    /// The paid tier this kind's pipeline grants.
    pub fn paid_tier(&self) -> MembershipTier {
        match self {
            EntityKind::Individual => MembershipTier::Premium,
            EntityKind::Corporate => MembershipTier::Corporate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Individual => "individual",
            EntityKind::Corporate => "corporate",
        }
    }

    /// Parses the kind from its correlation-metadata string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "individual" => Some(EntityKind::Individual),
            "corporate" => Some(EntityKind::Corporate),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Membership tier: the feature-access level granted to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipTier {
    /// No paid features.
    Free,

    /// Paid tier for individual subscribers.
    Premium,

    /// Paid tier for corporate tenants.
    Corporate,
}

impl MembershipTier {
    /// Returns true if this tier is a paid tier.
    pub fn is_paid(&self) -> bool {
        !matches!(self, MembershipTier::Free)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MembershipTier::Free => "Free",
            MembershipTier::Premium => "Premium",
            MembershipTier::Corporate => "Corporate",
        }
    }
}

impl std::fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
