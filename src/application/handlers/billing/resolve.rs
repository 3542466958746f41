//! Account resolution.
//!
//! Finds which account a billing fact belongs to, in strict priority
//! order: stored subscription id, stored customer id, then the account id
//! carried in correlation metadata. Checkout facts resolved through
//! correlation get their provider identifiers attached immediately so the
//! association persists even if the subsequent status write turns out
//! stale.

use std::sync::Arc;

use crate::domain::billing::{BillingAccount, BillingError, BillingFact};
use crate::ports::AccountStore;

/// How (or whether) a fact was matched to an account.
#[derive(Debug)]
pub enum Resolution {
    /// Matched through a stored provider identifier.
    Found(BillingAccount),

    /// Matched through correlation metadata; provider ids were attached.
    Bootstrapped(BillingAccount),

    /// No account matches. The caller acknowledges and logs.
    NotFound,
}

pub struct AccountResolver {
    store: Arc<dyn AccountStore>,
}

impl AccountResolver {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, fact: &BillingFact) -> Result<Resolution, BillingError> {
        if let Some(account) = self
            .store
            .find_by_subscription_id(&fact.subscription_id)
            .await?
        {
            return Ok(Resolution::Found(account));
        }

        if let Some(account) = self.store.find_by_customer_id(&fact.customer_id).await? {
            return Ok(Resolution::Found(account));
        }

        let Some(correlation) = &fact.correlation else {
            return Ok(Resolution::NotFound);
        };
        let Some(account) = self.store.find_by_id(&correlation.account_id).await? else {
            return Ok(Resolution::NotFound);
        };

        if fact.is_checkout() && account.customer_id.is_none() {
            // First contact with the provider for this account. Attach the
            // ids now, outside the conditional status write.
            self.store
                .attach_provider_ids(
                    &account.id,
                    &fact.customer_id,
                    Some(&fact.subscription_id),
                )
                .await?;
            tracing::info!(
                account_id = %account.id,
                customer_id = %fact.customer_id,
                subscription_id = %fact.subscription_id,
                "bootstrapped provider association from checkout"
            );
            let account = self
                .store
                .find_by_id(&account.id)
                .await?
                .ok_or_else(|| BillingError::Store("account vanished after attach".into()))?;
            return Ok(Resolution::Bootstrapped(account));
        }

        Ok(Resolution::Found(account))
    }
}
