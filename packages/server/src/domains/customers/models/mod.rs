pub mod consent;

pub use consent::{resolve_consent, subscriptions_for, ConsentFlags};
