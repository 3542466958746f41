//! Billing-state reconciliation service.
//!
//! Receives payment-provider webhooks for two integration paths
//! (individual subscriptions and corporate tenants), authenticates them,
//! and reconciles each account's subscription state and membership tier.
//! Processing is idempotent across redeliveries, monotonic against
//! not-yet-decided statuses, and ordered against out-of-order delivery.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
