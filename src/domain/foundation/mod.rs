//! Foundation value objects shared across the domain.

mod ids;
mod timestamp;

pub use ids::AccountId;
pub use timestamp::Timestamp;
