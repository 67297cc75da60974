// Common types shared across domains
pub mod outcome;

pub use outcome::{DispatchReport, NotificationOutcome, SkipReason};
