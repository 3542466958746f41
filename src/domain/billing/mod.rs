//! Billing domain: the state machine between provider events and accounts.

pub mod account;
pub mod entity_kind;
pub mod errors;
pub mod fact;
pub mod mapper;
pub mod provider_event;
pub mod status;
pub mod verifier;

pub use account::BillingAccount;
pub use entity_kind::{EntityKind, MembershipTier};
pub use errors::BillingError;
pub use fact::{BillingFact, Classification, CorrelationMetadata};
pub use mapper::{map_status, StatusMapping, TierEffect};
pub use provider_event::{ProviderEvent, ProviderEventType};
pub use status::{ProviderStatus, SubscriptionState};
pub use verifier::{sign_payload, WebhookVerifier};
