//! Account store port.

use async_trait::async_trait;

use crate::domain::billing::{BillingAccount, BillingError};
use crate::domain::foundation::AccountId;

/// Outcome of a conditional account write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The account was updated.
    Applied,

    /// The stored last-applied event timestamp was at or after the
    /// incoming one; nothing was written.
    Stale,
}

/// Persistence port for billing accounts.
///
/// Lookups mirror the resolver's priority order: subscription id first,
/// then customer id, then the account id carried in correlation metadata.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<BillingAccount>, BillingError>;

    async fn find_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> Result<Option<BillingAccount>, BillingError>;

    async fn find_by_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<BillingAccount>, BillingError>;

    async fn insert(&self, account: BillingAccount) -> Result<(), BillingError>;

    /// Writes the account only if `event_at` is strictly after the stored
    /// account's last-applied event timestamp. The comparison and the
    /// write happen atomically with respect to other callers.
    async fn update_if_newer(
        &self,
        account: &BillingAccount,
        event_at: i64,
    ) -> Result<WriteOutcome, BillingError>;

    /// Attaches provider identifiers to an account without touching its
    /// state, tier or ordering timestamp. Used to bootstrap the checkout
    /// association so it survives even when the status write is stale.
    async fn attach_provider_ids(
        &self,
        id: &AccountId,
        customer_id: &str,
        subscription_id: Option<&str>,
    ) -> Result<(), BillingError>;
}
