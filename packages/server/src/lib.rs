// Klaviyo Bridge - Core
//
// Forwards commerce lifecycle events from a Medusa store to Klaviyo.
// Cart activity is inferred from successive cart snapshots; order, return and
// customer notifications are translated one-to-one.
//
// Domains live in domains/*; infrastructure traits and adapters in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
