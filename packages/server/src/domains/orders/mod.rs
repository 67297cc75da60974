//! Orders domain - one marketing event per order or return notification.
//!
//! No state is kept: each notification is trusted to be delivered once and
//! maps to exactly one event, or to none when the order has no email.

pub mod actions;

pub use actions::{
    on_order_canceled, on_order_completed, on_order_placed, on_order_shipped,
    on_return_received, on_return_requested, ReturnStage,
};
