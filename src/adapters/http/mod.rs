//! HTTP adapter: axum handlers and routes.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::BillingAppState;
pub use routes::billing_routes;
