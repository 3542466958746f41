//! Billing use-case handlers.

pub mod classify;
pub mod process_webhook;
pub mod reconcile;
pub mod resolve;
pub mod retention;
pub mod start_checkout;

pub use classify::EventClassifier;
pub use process_webhook::{ProcessOutcome, WebhookPipeline};
pub use reconcile::{ReconcileOutcome, Reconciler};
pub use resolve::{AccountResolver, Resolution};
pub use retention::RetentionSweeper;
pub use start_checkout::{StartCheckoutCommand, StartCheckoutHandler};
