//! Customers domain - profile sync and channel consent.

pub mod actions;
pub mod models;

pub use actions::{on_customer_upserted, profile_attributes};
pub use models::{resolve_consent, subscriptions_for, ConsentFlags};
