//! Notifications domain - host webhook envelopes routed to entry points.

pub mod effects;
pub mod events;

pub use effects::handle_event;
pub use events::{CommerceEvent, EnvelopeError, EventData, WebhookEnvelope};
