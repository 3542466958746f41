//! In-memory account store.
//!
//! Backs tests and local development. Lookups by provider id scan the map;
//! fine at this scale. The conditional write holds the write lock across
//! the compare and the store, which gives the atomicity the port requires.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::billing::{BillingAccount, BillingError};
use crate::domain::foundation::AccountId;
use crate::ports::{AccountStore, WriteOutcome};

#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, BillingAccount>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<BillingAccount>, BillingError> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn find_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> Result<Option<BillingAccount>, BillingError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.subscription_id.as_deref() == Some(subscription_id))
            .cloned())
    }

    async fn find_by_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<BillingAccount>, BillingError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.customer_id.as_deref() == Some(customer_id))
            .cloned())
    }

    async fn insert(&self, account: BillingAccount) -> Result<(), BillingError> {
        self.accounts.write().await.insert(account.id, account);
        Ok(())
    }

    async fn update_if_newer(
        &self,
        account: &BillingAccount,
        event_at: i64,
    ) -> Result<WriteOutcome, BillingError> {
        let mut accounts = self.accounts.write().await;
        let stored = accounts
            .get(&account.id)
            .ok_or_else(|| BillingError::Store(format!("no account {}", account.id)))?;

        if let Some(last) = stored.last_event_at {
            if event_at <= last {
                return Ok(WriteOutcome::Stale);
            }
        }
        debug_assert!(account.is_consistent());
        accounts.insert(account.id, account.clone());
        Ok(WriteOutcome::Applied)
    }

    async fn attach_provider_ids(
        &self,
        id: &AccountId,
        customer_id: &str,
        subscription_id: Option<&str>,
    ) -> Result<(), BillingError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(id)
            .ok_or_else(|| BillingError::Store(format!("no account {id}")))?;
        account.customer_id = Some(customer_id.to_string());
        if let Some(subscription_id) = subscription_id {
            account.subscription_id = Some(subscription_id.to_string());
        }
        Ok(())
    }
}
